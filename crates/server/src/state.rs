use std::sync::Arc;

use service::residents::ResidentService;

/// Shared handler state; built once at startup and cloned per request.
#[derive(Clone)]
pub struct ServerState {
    pub residents: Arc<ResidentService>,
}

impl ServerState {
    pub fn new(residents: ResidentService) -> Self {
        Self { residents: Arc::new(residents) }
    }
}

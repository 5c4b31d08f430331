use thiserror::Error;

use crate::media::MediaError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("image upload failed: {0}")]
    Upload(#[from] MediaError),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn missing_fields() -> Self { Self::Validation("Missing required fields".into()) }

    /// True for failures the caller caused.
    pub fn is_client_error(&self) -> bool { matches!(self, Self::Validation(_)) }
}

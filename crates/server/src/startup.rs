use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{errors::StartupError, metrics, routes, state::ServerState};
use service::{
    media::{CloudinaryMediaHost, DisabledMediaHost, MediaHost},
    residents::{repository::MongoResidentRepository, ResidentService},
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    cfg.server
        .bind_addr()
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}: {e}", cfg.server.bind_addr())))
}

fn build_media_host(cfg: &AppConfig) -> Result<Arc<dyn MediaHost>, StartupError> {
    match cfg.media.credentials() {
        Some(creds) => {
            info!(cloud_name = %creds.cloud_name, "media host configured");
            Ok(Arc::new(CloudinaryMediaHost::new(creds, &cfg.media)?))
        }
        None => {
            warn!("media credentials missing; image uploads will fail");
            Ok(Arc::new(DisabledMediaHost))
        }
    }
}

/// Connect the store, wire the service and return the ready router.
///
/// Fails when the database cannot be reached; nothing is served in that case.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    // DB connection
    let db = models::db::connect_with_config(&cfg.database).await?;
    let repo = Arc::new(MongoResidentRepository::new(&db, &cfg.database.collection));
    // Image host
    let media = build_media_host(cfg)?;

    // Build router
    metrics::init();
    let state = ServerState::new(ResidentService::new(repo, media));
    Ok(routes::build_router(state, build_cors(), cfg.server.max_body_bytes))
}

/// Public entry: build the app and run the HTTP server until Ctrl+C / SIGTERM.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    // Bind and serve
    let addr = load_bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_addr_is_parsed_from_server_config() {
        let mut cfg = AppConfig::default();
        cfg.server.host = "127.0.0.1".into();
        cfg.server.port = 8081;
        assert_eq!(load_bind_addr(&cfg).unwrap(), "127.0.0.1:8081".parse::<SocketAddr>().unwrap());
        cfg.server.host = "not a host".into();
        assert!(matches!(load_bind_addr(&cfg), Err(StartupError::InvalidConfig(_))));
    }
}

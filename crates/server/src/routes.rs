use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::{metrics, openapi::ApiDoc, state::ServerState};

pub mod extract;
pub mod residents;
pub mod upload;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "OK", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: resident routes, upload, health, metrics and docs.
pub fn build_router(state: ServerState, cors: CorsLayer, max_body_bytes: usize) -> Router {
    // Resident API, body size capped
    let api = Router::new()
        .route("/residents", get(residents::list).post(residents::create))
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state);

    // Health, metrics and docs
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Compose
    ops.merge(api)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // request received
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // response sent, with status and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// JSON error body `{"error": ..., "detail"?: ...}`.
///
/// Detail is only sent for client errors; for server errors it is logged instead.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, None)
    }

    /// 500 with a generic message; `cause` is kept for the log line only.
    pub fn internal(error: impl Into<String>, cause: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, Some(cause.to_string()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, detail = ?self.detail, "request failed");
            serde_json::json!({ "error": self.error })
        } else {
            match self.detail {
                Some(detail) => serde_json::json!({ "error": self.error, "detail": detail }),
                None => serde_json::json!({ "error": self.error }),
            }
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(#[from] models::errors::ModelError),
    #[error("media host setup failed: {0}")]
    Media(#[from] service::media::MediaError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn server_errors_hide_detail() {
        let resp = JsonApiError::internal("Failed to add resident", "connection reset by peer").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "Failed to add resident" }));
    }

    #[tokio::test]
    async fn client_errors_keep_detail() {
        let resp = JsonApiError::new(StatusCode::BAD_REQUEST, "Malformed request body", Some("expected `,`".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["detail"], "expected `,`");
    }
}

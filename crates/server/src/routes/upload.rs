use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::{errors::JsonApiError, metrics, routes::extract::read_image_field, state::ServerState};

/// Multipart field holding the file for `POST /upload`.
pub const UPLOAD_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[utoipa::path(
    post, path = "/upload", tag = "upload",
    request_body(content = crate::openapi::UploadRequestDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Uploaded", body = crate::openapi::UploadResponseDoc),
        (status = 400, description = "No file uploaded", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Image upload failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, JsonApiError> {
    // a body that is not multipart cannot carry a file either
    let Ok(multipart) = multipart else {
        return Err(JsonApiError::bad_request("No file uploaded"));
    };
    let Some(image) = read_image_field(multipart, UPLOAD_FIELD).await? else {
        return Err(JsonApiError::bad_request("No file uploaded"));
    };
    match state.residents.upload_image(image).await {
        Ok(uploaded) => {
            metrics::UPLOADS_TOTAL.inc();
            Ok(Json(UploadResponse { url: uploaded.secure_url }))
        }
        Err(e) => {
            metrics::UPLOAD_FAILURES_TOTAL.inc();
            Err(JsonApiError::internal("Image upload failed", e))
        }
    }
}

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use service::{errors::ServiceError, residents::Resident};

use crate::{errors::JsonApiError, metrics, routes::extract::ResidentSubmission, state::ServerState};

#[derive(Debug, Serialize)]
pub struct ResidentList {
    pub residents: Vec<Resident>,
}

#[utoipa::path(
    get, path = "/residents", tag = "residents",
    responses(
        (status = 200, description = "All residents, newest first", body = crate::openapi::ResidentListDoc),
        (status = 500, description = "Failed to fetch residents", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<ResidentList>, JsonApiError> {
    match state.residents.list().await {
        Ok(residents) => Ok(Json(ResidentList { residents })),
        Err(e) => {
            metrics::STORAGE_ERRORS_TOTAL.inc();
            Err(JsonApiError::internal("Failed to fetch residents", e))
        }
    }
}

#[utoipa::path(
    post, path = "/residents", tag = "residents",
    request_body(content = crate::openapi::CreateResidentDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::ResidentDoc),
        (status = 400, description = "Missing required fields", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Image upload or storage failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    submission: ResidentSubmission,
) -> Result<(StatusCode, Json<Resident>), JsonApiError> {
    let had_image = submission.image.is_some();
    match state.residents.create(submission.input, submission.image).await {
        Ok(resident) => {
            if had_image {
                metrics::UPLOADS_TOTAL.inc();
            }
            metrics::RESIDENTS_CREATED_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(resident)))
        }
        Err(e) => Err(create_error(e, had_image)),
    }
}

fn create_error(e: ServiceError, had_image: bool) -> JsonApiError {
    match e {
        ServiceError::Validation(msg) => JsonApiError::bad_request(msg),
        ServiceError::Upload(err) => {
            metrics::UPLOAD_FAILURES_TOTAL.inc();
            JsonApiError::internal("Image upload failed", err)
        }
        err @ ServiceError::Db(_) => {
            if had_image {
                metrics::UPLOADS_TOTAL.inc();
            }
            metrics::STORAGE_ERRORS_TOTAL.inc();
            JsonApiError::internal("Failed to add resident", err)
        }
    }
}

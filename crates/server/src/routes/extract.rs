//! Body decoding for resident submissions.
//!
//! `POST /residents` accepts JSON, urlencoded and multipart bodies. Multipart
//! parts that carry a file name under `profilePhoto` or `image` are the attached
//! image; every other part is read as a text field.

use axum::{
    async_trait,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use service::media::ImageUpload;
use service::residents::ResidentInput;

use crate::errors::JsonApiError;

/// Multipart field names accepted as the resident's photo file.
pub const PHOTO_FILE_FIELDS: [&str; 2] = ["profilePhoto", "image"];

/// Decoded create request: text fields plus the optional attached image.
#[derive(Debug, Default)]
pub struct ResidentSubmission {
    pub input: ResidentInput,
    pub image: Option<ImageUpload>,
}

/// Oversized bodies keep 413; any other client-side decode failure is a 400.
fn malformed(status: StatusCode, detail: String) -> JsonApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return JsonApiError::new(status, "Request body too large", Some(detail));
    }
    let status = if status.is_client_error() { StatusCode::BAD_REQUEST } else { status };
    JsonApiError::new(status, "Malformed request body", Some(detail))
}

fn multipart_error(e: MultipartError) -> JsonApiError {
    malformed(e.status(), e.body_text())
}

#[async_trait]
impl<S> FromRequest<S> for ResidentSubmission
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| malformed(e.status(), e.body_text()))?;
            read_submission(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(input) = Json::<ResidentInput>::from_request(req, state)
                .await
                .map_err(|e| malformed(e.status(), e.body_text()))?;
            Ok(Self { input, image: None })
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(input) = Form::<ResidentInput>::from_request(req, state)
                .await
                .map_err(|e| malformed(e.status(), e.body_text()))?;
            Ok(Self { input, image: None })
        } else {
            Err(JsonApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported content type",
                Some("expected multipart/form-data, application/x-www-form-urlencoded or application/json".into()),
            ))
        }
    }
}

async fn read_submission(mut multipart: Multipart) -> Result<ResidentSubmission, JsonApiError> {
    let mut submission = ResidentSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        if is_file {
            if !PHOTO_FILE_FIELDS.contains(&name.as_str()) {
                continue;
            }
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // browsers send an empty part when no file was picked
            if bytes.is_empty() {
                continue;
            }
            submission.image = Some(ImageUpload { bytes, file_name, content_type });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        let input = &mut submission.input;
        match name.as_str() {
            "firstName" => input.first_name = Some(value),
            "lastName" => input.last_name = Some(value),
            "role" => input.role = Some(value),
            "profilePhoto" => input.profile_photo = Some(value),
            "linkedin" => input.linkedin = Some(value),
            "twitter" => input.twitter = Some(value),
            _ => {}
        }
    }
    Ok(submission)
}

/// First non-empty file in the multipart field `field_name`, if any.
pub async fn read_image_field(mut multipart: Multipart, field_name: &str) -> Result<Option<ImageUpload>, JsonApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) || field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if !bytes.is_empty() {
            return Ok(Some(ImageUpload { bytes, file_name, content_type }));
        }
    }
    Ok(None)
}

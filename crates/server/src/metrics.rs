use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static RESIDENTS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resident_store_residents_created_total",
        "Residents successfully created"
    )
    .expect("register residents_created_total")
});

pub static UPLOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resident_store_uploads_total",
        "Images successfully forwarded to the media host"
    )
    .expect("register uploads_total")
});

pub static UPLOAD_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resident_store_upload_failures_total",
        "Image uploads rejected or failed at the media host"
    )
    .expect("register upload_failures_total")
});

pub static STORAGE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "resident_store_storage_errors_total",
        "Document store reads or writes that failed"
    )
    .expect("register storage_errors_total")
});

/// Touch every counter so they show up in the exposition before first use.
pub fn init() {
    Lazy::force(&RESIDENTS_CREATED_TOTAL);
    Lazy::force(&UPLOADS_TOTAL);
    Lazy::force(&UPLOAD_FAILURES_TOTAL);
    Lazy::force(&STORAGE_ERRORS_TOTAL);
}

pub fn gather_text() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub async fn metrics_handler() -> impl IntoResponse {
    match gather_text() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response(),
        Err(e) => crate::errors::JsonApiError::internal("Failed to encode metrics", e).into_response(),
    }
}

//! Media host abstraction: image bytes in, durable URL out.

pub mod cloudinary;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cloudinary::CloudinaryMediaHost;

/// An image received from a client, held in memory until it is forwarded.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self { bytes: bytes.into(), file_name: None, content_type: None }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize { self.bytes.len() }

    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host is not configured")]
    NotConfigured,
    #[error("empty image")]
    EmptyFile,
    #[error("media host request failed: {0}")]
    Http(String),
    #[error("media host rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected media host response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError>;

    /// Remove a previously uploaded asset.
    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Stand-in used when no media credentials are configured; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _image: ImageUpload) -> Result<UploadedImage, MediaError> {
        Err(MediaError::NotConfigured)
    }

    async fn delete(&self, _public_id: &str) -> Result<(), MediaError> {
        Err(MediaError::NotConfigured)
    }
}

/// Simple in-memory media host for tests and local runs.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryMediaHost {
        uploads: Mutex<Vec<(UploadedImage, ImageUpload)>>,
        deleted: Mutex<Vec<String>>,
        fail_uploads: AtomicBool,
    }

    impl InMemoryMediaHost {
        pub fn new() -> Self { Self::default() }

        /// A host whose uploads always fail, as an unreachable service would.
        pub fn failing() -> Self {
            let host = Self::default();
            host.set_fail_uploads(true);
            host
        }

        pub fn set_fail_uploads(&self, fail: bool) {
            self.fail_uploads.store(fail, Ordering::SeqCst);
        }

        pub fn uploaded(&self) -> Vec<UploadedImage> {
            self.uploads.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
        }

        pub fn uploaded_bytes(&self) -> Vec<bytes::Bytes> {
            self.uploads.lock().unwrap().iter().map(|(_, i)| i.bytes.clone()).collect()
        }

        pub fn deleted(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaHost for InMemoryMediaHost {
        async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(MediaError::Http("connection refused".into()));
            }
            if image.is_empty() {
                return Err(MediaError::EmptyFile);
            }
            let mut uploads = self.uploads.lock().unwrap();
            let public_id = format!("residents/img_{}", uploads.len() + 1);
            let uploaded = UploadedImage {
                secure_url: format!("https://media.test/image/upload/{public_id}.jpg"),
                public_id,
            };
            uploads.push((uploaded.clone(), image));
            Ok(uploaded)
        }

        async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
            self.deleted.lock().unwrap().push(public_id.to_string());
            Ok(())
        }
    }
}

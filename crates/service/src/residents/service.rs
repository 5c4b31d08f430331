use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::domain::{Resident, ResidentInput};
use super::repository::ResidentRepository;
use crate::errors::ServiceError;
use crate::media::{ImageUpload, MediaHost, UploadedImage};

/// Resident use cases: list, create, and standalone image upload.
///
/// Create runs validate → upload (when an image is attached) → insert. A failed
/// insert after a successful upload deletes the uploaded asset again.
pub struct ResidentService {
    repo: Arc<dyn ResidentRepository>,
    media: Arc<dyn MediaHost>,
}

impl ResidentService {
    pub fn new(repo: Arc<dyn ResidentRepository>, media: Arc<dyn MediaHost>) -> Self {
        Self { repo, media }
    }

    pub async fn list(&self) -> Result<Vec<Resident>, ServiceError> {
        let residents = self.repo.list_newest_first().await?;
        info!(count = residents.len(), "list residents");
        Ok(residents)
    }

    /// Create a resident; an attached image wins over the `profilePhoto` field.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::media::mock::InMemoryMediaHost;
    /// use service::residents::{repository::mock::InMemoryResidentRepository, ResidentInput, ResidentService};
    /// let svc = ResidentService::new(Arc::new(InMemoryResidentRepository::new()), Arc::new(InMemoryMediaHost::new()));
    /// let input = ResidentInput {
    ///     first_name: Some("Ada".into()),
    ///     last_name: Some("Lovelace".into()),
    ///     role: Some("Resident".into()),
    ///     ..Default::default()
    /// };
    /// let created = tokio_test::block_on(svc.create(input, None)).unwrap();
    /// assert_eq!(created.profile_photo, "");
    /// ```
    #[instrument(skip_all, fields(has_image = image.is_some()))]
    pub async fn create(&self, input: ResidentInput, image: Option<ImageUpload>) -> Result<Resident, ServiceError> {
        let validated = input.validate()?;

        let uploaded = match image {
            Some(image) => Some(self.media.upload(image).await.map_err(|e| {
                error!(err = %e, "image upload failed");
                ServiceError::Upload(e)
            })?),
            None => None,
        };
        let profile_photo = match &uploaded {
            Some(u) => u.secure_url.clone(),
            None => validated.profile_photo.clone().unwrap_or_default(),
        };

        let new = validated.into_new_resident(profile_photo);
        match self.repo.insert(new).await {
            Ok(resident) => {
                info!(resident_id = %resident.id, "resident_created");
                Ok(resident)
            }
            Err(e) => {
                error!(err = %e, "failed to add resident");
                if let Some(u) = uploaded {
                    self.discard_upload(&u).await;
                }
                Err(e)
            }
        }
    }

    /// Upload without persisting anything.
    #[instrument(skip_all, fields(size = image.len()))]
    pub async fn upload_image(&self, image: ImageUpload) -> Result<UploadedImage, ServiceError> {
        let uploaded = self.media.upload(image).await?;
        info!(public_id = %uploaded.public_id, "image_uploaded");
        Ok(uploaded)
    }

    async fn discard_upload(&self, uploaded: &UploadedImage) {
        match self.media.delete(&uploaded.public_id).await {
            Ok(()) => info!(public_id = %uploaded.public_id, "orphaned upload deleted"),
            Err(e) => warn!(public_id = %uploaded.public_id, err = %e, "orphaned upload could not be deleted"),
        }
    }
}

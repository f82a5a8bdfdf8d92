use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::constants::{
    ALLOWED_IMAGE_MIMES, LIMIT_FILE_COUNT, LIMIT_FILE_SIZE, LIMIT_UNEXPECTED_FILE,
    MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES, UPLOADS_PREFIX,
};
use crate::entities::image::{Image, ImageSource, NewImage, Owner};
use crate::errors::AppError;
use crate::repositories::image::ImageRepository;
use crate::repositories::owner::OwnerRepository;
use crate::storage::disk::DiskStorage;

/// A file already materialized in the upload directory but not yet
/// registered in the image store.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub stored_name: String,
}

/// Takes raw multipart file parts to registered image rows, cleaning up
/// after itself on every failure path so no orphan files survive a
/// rejected request.
pub struct UploadIngestor<I, O>
where
    I: ImageRepository,
    O: OwnerRepository,
{
    pub image_repo: I,
    pub owner_repo: O,
    pub storage: DiskStorage,
}

impl<I, O> UploadIngestor<I, O>
where
    I: ImageRepository,
    O: OwnerRepository,
{
    pub fn new(image_repo: I, owner_repo: O, storage: DiskStorage) -> Self {
        UploadIngestor {
            image_repo,
            owner_repo,
            storage,
        }
    }

    /// Streams every file part to disk, enforcing the count, size, and
    /// mime-type limits as bytes arrive. On any violation all files stored
    /// so far in this batch are deleted before the error is returned.
    pub async fn collect(&self, payload: &mut Multipart) -> Result<Vec<StoredUpload>, AppError> {
        let mut stored: Vec<StoredUpload> = Vec::new();

        loop {
            let mut field = match payload.try_next().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    self.discard_batch(&stored).await;
                    return Err(AppError::InvalidInput(format!(
                        "Malformed multipart payload: {}",
                        e
                    )));
                }
            };

            if stored.len() == MAX_UPLOAD_FILES {
                self.discard_batch(&stored).await;
                return Err(AppError::UploadConstraint {
                    code: LIMIT_FILE_COUNT,
                    message: format!("Upload exceeds the {} file limit", MAX_UPLOAD_FILES),
                });
            }

            let declared = field
                .content_type()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_default();
            if !ALLOWED_IMAGE_MIMES.contains(&declared.as_str()) {
                self.discard_batch(&stored).await;
                return Err(AppError::UploadConstraint {
                    code: LIMIT_UNEXPECTED_FILE,
                    message: "Only JPEG, PNG or GIF images are allowed".to_string(),
                });
            }

            let original_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|s| s.to_string()));
            let stored_name = self.storage.unique_name(original_name.as_deref());

            let mut file = match self.storage.create(&stored_name).await {
                Ok(file) => file,
                Err(e) => {
                    self.discard_batch(&stored).await;
                    return Err(e.into());
                }
            };

            let mut written = 0usize;
            let mut sniffed = false;

            loop {
                let chunk = match field.try_next().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        self.discard_with(&stored, &stored_name).await;
                        return Err(AppError::InvalidInput(format!(
                            "Upload stream interrupted: {}",
                            e
                        )));
                    }
                };

                written += chunk.len();
                if written > MAX_UPLOAD_BYTES {
                    self.discard_with(&stored, &stored_name).await;
                    return Err(AppError::UploadConstraint {
                        code: LIMIT_FILE_SIZE,
                        message: format!(
                            "File exceeds the {} MB size limit",
                            MAX_UPLOAD_BYTES / (1024 * 1024)
                        ),
                    });
                }

                // Sniff the leading bytes once: a part declaring image/png
                // but carrying something else is rejected outright.
                if !sniffed {
                    sniffed = true;
                    if let Some(kind) = infer::get(&chunk) {
                        if !ALLOWED_IMAGE_MIMES.contains(&kind.mime_type()) {
                            self.discard_with(&stored, &stored_name).await;
                            return Err(AppError::UploadConstraint {
                                code: LIMIT_UNEXPECTED_FILE,
                                message: format!(
                                    "File content is {}, not an allowed image type",
                                    kind.mime_type()
                                ),
                            });
                        }
                    }
                }

                if let Err(e) = file.write_all(&chunk).await {
                    self.discard_with(&stored, &stored_name).await;
                    return Err(e.into());
                }
            }

            if let Err(e) = file.flush().await {
                self.discard_with(&stored, &stored_name).await;
                return Err(e.into());
            }

            debug!(file = %stored_name, bytes = written, "Stored upload part");
            stored.push(StoredUpload { stored_name });
        }

        if stored.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one image file is required".to_string(),
            ));
        }

        Ok(stored)
    }

    /// Registers already-stored files against an owner. The owner check
    /// happens after the files hit disk (they are streamed there during
    /// parsing), so a missing owner deletes the whole batch. A failed row
    /// insert deletes that file and every later unregistered one;
    /// rows already created for earlier files stay, matching their files.
    pub async fn ingest(
        &self,
        owner: Owner,
        uploads: Vec<StoredUpload>,
        public_base: &str,
    ) -> Result<Vec<Image>, AppError> {
        let exists = match self.owner_repo.owner_exists(&owner).await {
            Ok(exists) => exists,
            Err(e) => {
                self.discard_batch(&uploads).await;
                return Err(e);
            }
        };
        if !exists {
            self.discard_batch(&uploads).await;
            return Err(AppError::NotFound(format!("{} not found", owner.kind)));
        }

        let base = public_base.trim_end_matches('/');
        for (idx, upload) in uploads.iter().enumerate() {
            let new_image = NewImage {
                url: format!("{}{}/{}", base, UPLOADS_PREFIX, upload.stored_name),
                source: ImageSource::DeviceUpload,
                owner,
            };

            if let Err(e) = self.image_repo.create_image(&new_image).await {
                warn!(owner = %owner, error = %e, "Image registration failed, removing stored files");
                self.discard_batch(&uploads[idx..]).await;
                return Err(e);
            }
        }

        self.image_repo.find_by_owner(&owner).await
    }

    async fn discard_batch(&self, uploads: &[StoredUpload]) {
        for upload in uploads {
            let _ = self.storage.remove(&upload.stored_name).await;
        }
    }

    async fn discard_with(&self, uploads: &[StoredUpload], extra: &str) {
        let _ = self.storage.remove(extra).await;
        self.discard_batch(uploads).await;
    }
}

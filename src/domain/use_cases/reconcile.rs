use tracing::debug;

use crate::entities::image::{Image, ImageAction, ImageInput, Owner};
use crate::errors::AppError;
use crate::repositories::image::ImageRepository;
use crate::repositories::owner::OwnerRepository;

/// Applies add / replace / remove mutations to an owner's attachment set.
///
/// Validation happens before any destructive step on every branch, and the
/// returned list is always a fresh re-read of the store rather than an echo
/// of this call's own writes. There is no transaction around the
/// delete+create sequence: two concurrent `replace` calls on the same owner
/// can interleave and leave a mix of both batches behind. Last writer wins.
pub struct AttachmentReconciler<I, O>
where
    I: ImageRepository,
    O: OwnerRepository,
{
    pub image_repo: I,
    pub owner_repo: O,
}

impl<I, O> AttachmentReconciler<I, O>
where
    I: ImageRepository,
    O: OwnerRepository,
{
    pub fn new(image_repo: I, owner_repo: O) -> Self {
        AttachmentReconciler {
            image_repo,
            owner_repo,
        }
    }

    pub async fn reconcile(
        &self,
        owner: Owner,
        action: ImageAction,
        images: &[ImageInput],
    ) -> Result<Vec<Image>, AppError> {
        if !self.owner_repo.owner_exists(&owner).await? {
            return Err(AppError::NotFound(format!("{} not found", owner.kind)));
        }

        match action {
            ImageAction::Remove => {
                self.image_repo.delete_by_owner(&owner).await?;
            }
            ImageAction::Replace => {
                validate_image_inputs(images)?;
                self.image_repo.delete_by_owner(&owner).await?;
                self.create_all(owner, images).await?;
            }
            ImageAction::Add => {
                validate_image_inputs(images)?;
                self.create_all(owner, images).await?;
            }
        }

        debug!(owner = %owner, ?action, "Reconciled attachment set");

        // Re-read rather than trusting our own writes.
        self.image_repo.find_by_owner(&owner).await
    }

    async fn create_all(&self, owner: Owner, images: &[ImageInput]) -> Result<(), AppError> {
        for input in images {
            self.image_repo
                .create_image(&input.clone().into_new_image(owner))
                .await?;
        }
        Ok(())
    }
}

/// Every requested image must carry a non-empty url. Runs before any
/// deletion so a bad batch leaves the store untouched.
pub fn validate_image_inputs(images: &[ImageInput]) -> Result<(), AppError> {
    for (idx, input) in images.iter().enumerate() {
        if input.url.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "images[{}] requires a non-empty url",
                idx
            )));
        }
    }
    Ok(())
}

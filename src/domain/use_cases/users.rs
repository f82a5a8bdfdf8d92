use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::entities::image::{Image, ImageSource, NewImage, Owner};
use crate::entities::user::{
    ChangePasswordRequest, RegisterRequest, SetUserImageRequest, UpdateUserRequest, User,
    UserResponse,
};
use crate::errors::AppError;
use crate::repositories::image::ImageRepository;
use crate::repositories::user::UserRepository;

pub struct UserHandler<R, I>
where
    R: UserRepository,
    I: ImageRepository,
{
    pub user_repo: R,
    pub image_repo: I,
}

impl<R, I> UserHandler<R, I>
where
    R: UserRepository,
    I: ImageRepository,
{
    pub fn new(user_repo: R, image_repo: I) -> Self {
        UserHandler {
            user_repo,
            image_repo,
        }
    }

    /// Registers a new user after validation and password hashing.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AppError> {
        request.validate()?;

        if self
            .user_repo
            .get_user_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .user_repo
            .create_user(&request.prepare_for_insert(password_hash))
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(UserResponse::from_user(user, Vec::new()))
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.user_repo.get_all_users().await?;

        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(self.with_image(user).await?);
        }
        Ok(out)
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<UserResponse, AppError> {
        let user = self
            .user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.with_image(user).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        request: &UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        request.validate()?;

        let user = self
            .user_repo
            .update_user(id, &request.name, &request.email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        self.with_image(user).await
    }

    /// Changes the password after verifying the current one.
    pub async fn change_password(
        &self,
        id: i64,
        request: &ChangePasswordRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let user = self
            .user_repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let current_ok = verify_password(&request.current_password, &user.password_hash)?;
        if !current_ok {
            return Err(AppError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = hash_password(&request.new_password)?;
        self.user_repo.update_password(id, &new_hash).await?;
        Ok(())
    }

    /// Deletes a user and cascades to the attached image rows.
    pub async fn delete_user(&self, id: i64) -> Result<(), AppError> {
        if self.user_repo.get_user_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.image_repo.delete_by_owner(&Owner::user(id)).await?;
        self.user_repo.delete_user(id).await?;
        Ok(())
    }

    /// Sets the user's single image: existing rows go first, then the new
    /// one lands. Users carry at most one image by this replace semantic.
    pub async fn set_user_image(
        &self,
        id: i64,
        request: &SetUserImageRequest,
    ) -> Result<Image, AppError> {
        request.validate()?;

        if self.user_repo.get_user_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let owner = Owner::user(id);
        self.image_repo.delete_by_owner(&owner).await?;
        self.image_repo
            .create_image(&NewImage {
                url: request.url.clone(),
                source: ImageSource::Url,
                owner,
            })
            .await
    }

    async fn with_image(&self, user: User) -> Result<UserResponse, AppError> {
        let image = self.image_repo.find_by_owner(&Owner::user(user.id)).await?;
        Ok(UserResponse::from_user(user, image))
    }
}

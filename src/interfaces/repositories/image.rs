use async_trait::async_trait;

use crate::{
    entities::image::{Image, NewImage, Owner},
    errors::AppError,
    repositories::sqlx_repo::SqlxImageRepo,
};

/// Pure CRUD over the polymorphic `images` table. No business rules live
/// here; the reconciler and the ingestor own validation and cleanup.
/// Deletes are idempotent: removing what is already gone reports `false`.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn create_image(&self, image: &NewImage) -> Result<Image, AppError>;
    async fn get_image_by_id(&self, id: i64) -> Result<Option<Image>, AppError>;
    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Image>, AppError>;
    async fn delete_image(&self, id: i64) -> Result<bool, AppError>;
    async fn delete_by_owner(&self, owner: &Owner) -> Result<bool, AppError>;
}

impl SqlxImageRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxImageRepo { pool }
    }
}

#[async_trait]
impl ImageRepository for SqlxImageRepo {
    async fn create_image(&self, image: &NewImage) -> Result<Image, AppError> {
        let created = sqlx::query_as::<_, Image>(
            r#"
            INSERT INTO images (url, source, imageable_type, imageable_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&image.url)
        .bind(image.source.as_str())
        .bind(image.owner.kind.as_str())
        .bind(image.owner.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(created)
    }

    async fn get_image_by_id(&self, id: i64) -> Result<Option<Image>, AppError> {
        sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Image>, AppError> {
        sqlx::query_as::<_, Image>(
            "SELECT * FROM images WHERE imageable_type = $1 AND imageable_id = $2",
        )
        .bind(owner.kind.as_str())
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn delete_image(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_owner(&self, owner: &Owner) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM images WHERE imageable_type = $1 AND imageable_id = $2")
                .bind(owner.kind.as_str())
                .bind(owner.id)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }
}

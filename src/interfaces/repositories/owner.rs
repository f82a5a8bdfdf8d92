use async_trait::async_trait;

use crate::{
    entities::image::{Owner, OwnerKind},
    errors::AppError,
    repositories::sqlx_repo::SqlxOwnerRepo,
};

/// Existence probe for polymorphic owners. The reconciler and the ingestor
/// refuse to touch the image store for an owner that is not there.
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn owner_exists(&self, owner: &Owner) -> Result<bool, AppError>;
}

impl SqlxOwnerRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxOwnerRepo { pool }
    }
}

#[async_trait]
impl OwnerRepository for SqlxOwnerRepo {
    async fn owner_exists(&self, owner: &Owner) -> Result<bool, AppError> {
        let query = match owner.kind {
            OwnerKind::Article => "SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1)",
            OwnerKind::User => "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)",
        };

        let exists: bool = sqlx::query_scalar(query)
            .bind(owner.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(exists)
    }
}

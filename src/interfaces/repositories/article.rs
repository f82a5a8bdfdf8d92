use async_trait::async_trait;

use crate::{
    entities::article::{Article, ArticleInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxArticleRepo,
};

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create_article(&self, article: &ArticleInsert) -> Result<Article, AppError>;
    async fn get_all_articles(&self) -> Result<Vec<Article>, AppError>;
    async fn get_article_by_id(&self, id: i64) -> Result<Option<Article>, AppError>;
    async fn update_article(
        &self,
        id: i64,
        article: &ArticleInsert,
    ) -> Result<Option<Article>, AppError>;
    async fn delete_article(&self, id: i64) -> Result<bool, AppError>;
}

impl SqlxArticleRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxArticleRepo { pool }
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepo {
    async fn create_article(&self, article: &ArticleInsert) -> Result<Article, AppError> {
        sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (nombre, descripcion, price)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&article.name)
        .bind(&article.description)
        .bind(article.price)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn get_all_articles(&self) -> Result<Vec<Article>, AppError> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get_article_by_id(&self, id: i64) -> Result<Option<Article>, AppError> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn update_article(
        &self,
        id: i64,
        article: &ArticleInsert,
    ) -> Result<Option<Article>, AppError> {
        sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET nombre = $2, descripcion = $3, price = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&article.name)
        .bind(&article.description)
        .bind(article.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn delete_article(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }
}

use validator::Validate;

use crate::entities::article::{Article, ArticleInsert, ArticleWithImages, NewArticleRequest, UpdateArticleRequest};
use crate::entities::image::Owner;
use crate::errors::AppError;
use crate::repositories::article::ArticleRepository;
use crate::repositories::image::ImageRepository;
use crate::use_cases::reconcile::validate_image_inputs;

pub struct ArticleHandler<A, I>
where
    A: ArticleRepository,
    I: ImageRepository,
{
    pub article_repo: A,
    pub image_repo: I,
}

impl<A, I> ArticleHandler<A, I>
where
    A: ArticleRepository,
    I: ImageRepository,
{
    pub fn new(article_repo: A, image_repo: I) -> Self {
        ArticleHandler {
            article_repo,
            image_repo,
        }
    }

    /// Creates an article, attaching any inline image URLs. Image inputs
    /// are validated before the article row is written.
    pub async fn create_article(
        &self,
        request: NewArticleRequest,
    ) -> Result<ArticleWithImages, AppError> {
        request.validate()?;
        validate_image_inputs(&request.images)?;

        let article = self
            .article_repo
            .create_article(&ArticleInsert::from_request(&request))
            .await?;

        let owner = Owner::article(article.id);
        for input in request.images {
            self.image_repo
                .create_image(&input.into_new_image(owner))
                .await?;
        }

        self.with_images(article).await
    }

    pub async fn get_all_articles(&self) -> Result<Vec<ArticleWithImages>, AppError> {
        let articles = self.article_repo.get_all_articles().await?;

        let mut out = Vec::with_capacity(articles.len());
        for article in articles {
            out.push(self.with_images(article).await?);
        }
        Ok(out)
    }

    pub async fn get_article_by_id(&self, id: i64) -> Result<ArticleWithImages, AppError> {
        let article = self
            .article_repo
            .get_article_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        self.with_images(article).await
    }

    pub async fn update_article(
        &self,
        id: i64,
        request: &UpdateArticleRequest,
    ) -> Result<ArticleWithImages, AppError> {
        request.validate()?;

        let values = ArticleInsert {
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
        };

        let article = self
            .article_repo
            .update_article(id, &values)
            .await?
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        self.with_images(article).await
    }

    /// Deletes an article and cascades to its attachment rows, images first.
    pub async fn delete_article(&self, id: i64) -> Result<(), AppError> {
        if self.article_repo.get_article_by_id(id).await?.is_none() {
            return Err(AppError::NotFound("Article not found".to_string()));
        }

        self.image_repo.delete_by_owner(&Owner::article(id)).await?;
        self.article_repo.delete_article(id).await?;
        Ok(())
    }

    async fn with_images(&self, article: Article) -> Result<ArticleWithImages, AppError> {
        let images = self
            .image_repo
            .find_by_owner(&Owner::article(article.id))
            .await?;

        Ok(ArticleWithImages { article, images })
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::image::{Image, ImageInput};

/// One product row. Wire names stay Spanish for compatibility with the
/// mobile client the original API shipped with.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    #[serde(rename = "nombre")]
    #[sqlx(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    #[sqlx(rename = "descripcion")]
    pub description: String,
    pub price: f64,
}

/// Article plus its current attachment list, as every article endpoint
/// returns it.
#[derive(Debug, Serialize)]
pub struct ArticleWithImages {
    #[serde(flatten)]
    pub article: Article,
    pub images: Vec<Image>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewArticleRequest {
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "nombre is required"))]
    pub name: String,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, message = "descripcion is required"))]
    pub description: String,

    pub price: f64,

    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, message = "nombre is required"))]
    pub name: String,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, message = "descripcion is required"))]
    pub description: String,

    pub price: f64,
}

/// Column values for an article insert.
#[derive(Debug)]
pub struct ArticleInsert {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl ArticleInsert {
    pub fn from_request(req: &NewArticleRequest) -> Self {
        ArticleInsert {
            name: req.name.clone(),
            description: req.description.clone(),
            price: req.price,
        }
    }
}

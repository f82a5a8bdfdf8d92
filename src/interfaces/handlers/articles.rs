use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        article::{NewArticleRequest, UpdateArticleRequest},
        image::{ManageImagesRequest, Owner},
    },
    errors::AppError,
    AppState,
};

#[instrument(skip(state))]
#[get("/articles")]
pub async fn get_all_articles(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let articles = state.articles.get_all_articles().await?;
    Ok(HttpResponse::Ok().json(articles))
}

#[instrument(skip(state, data))]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<AppState>,
    data: web::Json<NewArticleRequest>,
) -> Result<impl Responder, AppError> {
    let article = state.articles.create_article(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(article))
}

#[instrument(skip(state))]
#[get("/articles/{id}")]
pub async fn get_article_by_id(
    state: web::Data<AppState>,
    article_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let article = state.articles.get_article_by_id(article_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(article))
}

#[instrument(skip(state, data))]
#[put("/articles/{id}")]
pub async fn update_article(
    state: web::Data<AppState>,
    article_id: web::Path<i64>,
    data: web::Json<UpdateArticleRequest>,
) -> Result<impl Responder, AppError> {
    let article = state
        .articles
        .update_article(article_id.into_inner(), &data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(article))
}

#[instrument(skip(state))]
#[delete("/articles/{id}")]
pub async fn delete_article(
    state: web::Data<AppState>,
    article_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.articles.delete_article(article_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add, replace, or remove the article's image set and echo back the
/// article as it now stands.
#[instrument(skip(state, data))]
#[post("/articles/{id}/images")]
pub async fn manage_article_images(
    state: web::Data<AppState>,
    article_id: web::Path<i64>,
    data: web::Json<ManageImagesRequest>,
) -> Result<impl Responder, AppError> {
    let id = article_id.into_inner();
    let request = data.into_inner();

    state
        .reconciler
        .reconcile(Owner::article(id), request.action, &request.images)
        .await?;

    let article = state.articles.get_article_by_id(id).await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Multipart device upload: files land in the upload directory and become
/// image rows whose urls point back at this host's `/uploads` route.
#[instrument(skip(state, req, payload))]
#[post("/articles/{id}/upload-images")]
pub async fn upload_article_images(
    state: web::Data<AppState>,
    article_id: web::Path<i64>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<impl Responder, AppError> {
    let id = article_id.into_inner();
    let public_base = {
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    };

    let stored = state.ingestor.collect(&mut payload).await?;
    state
        .ingestor
        .ingest(Owner::article(id), stored, &public_base)
        .await?;

    let article = state.articles.get_article_by_id(id).await?;
    Ok(HttpResponse::Created().json(article))
}

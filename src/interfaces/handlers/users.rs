use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::user::{
        ChangePasswordRequest, RegisterRequest, SetUserImageRequest, UpdateUserRequest,
    },
    errors::AppError,
    use_cases::extractors::AuthClaims,
    AppState,
};

#[instrument(skip(state, data))]
#[post("/users/register")]
pub async fn register(
    state: web::Data<AppState>,
    data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = state.users.register(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[instrument(skip(_claims, state))]
#[get("/users")]
pub async fn get_all_users(
    _claims: AuthClaims,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let users = state.users.get_all_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[instrument(skip(_claims, state))]
#[get("/users/{id}")]
pub async fn get_user_by_id(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let user = state.users.get_user_by_id(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(_claims, state, data))]
#[put("/users/{id}")]
pub async fn update_user(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    let user = state
        .users
        .update_user(user_id.into_inner(), &data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

#[instrument(skip(_claims, state, data))]
#[put("/users/{id}/password")]
pub async fn change_password(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    state
        .users
        .change_password(user_id.into_inner(), &data.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[instrument(skip(_claims, state))]
#[delete("/users/{id}")]
pub async fn delete_user(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    state.users.delete_user(user_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sets the user's profile image with replace semantics: one image per
/// user at any time.
#[instrument(skip(_claims, state, data))]
#[post("/users/{id}/image")]
pub async fn set_user_image(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    user_id: web::Path<i64>,
    data: web::Json<SetUserImageRequest>,
) -> Result<impl Responder, AppError> {
    let image = state
        .users
        .set_user_image(user_id.into_inner(), &data.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(image))
}

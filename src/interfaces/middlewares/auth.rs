use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{
    rc::Rc,
    task::{Context, Poll},
};

use crate::{errors::AuthError, repositories::user::UserRepository, AppState};

/// Bearer-token gate for the user endpoints. Articles, uploads, and user
/// registration stay public for the mobile client; everything under
/// `/api/users` otherwise needs a valid token that resolves to a live user.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path();
            let method = req.method().as_str();

            if is_public_route(path, method) {
                return service.call(req).await;
            }

            let state = match req.app_data::<web::Data<AppState>>() {
                Some(state) => state.clone(),
                None => {
                    tracing::error!("AppState missing in middleware");
                    return Ok(unauthorized(req, "Internal server error"));
                }
            };

            let token = match extract_token(&req) {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing or malformed Authorization header");
                    return Ok(unauthorized(req, "Missing or invalid credentials"));
                }
            };

            let claims = match state.jwt.decode_jwt(&token) {
                Ok(decoded) => decoded.claims,
                Err(AuthError::TokenExpired) => {
                    return Ok(unauthorized(req, "Token has expired"));
                }
                Err(_) => {
                    return Ok(unauthorized(req, "Invalid token"));
                }
            };

            // The token must still resolve to a live user.
            match state.users.user_repo.get_user_by_id(claims.user_id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::warn!(user_id = claims.user_id, "Token for unknown user");
                    return Ok(unauthorized(req, "Unknown user"));
                }
                Err(e) => {
                    tracing::error!("Failed to load acting user: {}", e);
                    return Ok(req.into_response(
                        HttpResponse::InternalServerError().json(serde_json::json!({
                            "status": "error",
                            "message": "Internal server error"
                        })),
                    ));
                }
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    if path == "/api/users/register" && method == "POST" {
        return true;
    }

    // Only the user endpoints are gated.
    !path.starts_with("/api/users")
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    req.into_response(HttpResponse::Unauthorized().json(serde_json::json!({
        "status": "error",
        "message": message
    })))
}

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

/// JSON extractor configuration that keeps body-deserialization failures
/// inside the standard error shape. Without it a malformed body short
/// circuits into actix's plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::InvalidInput(format!("Invalid JSON body: {}", err)).into()
}

use actix_web::{http::StatusCode, post, test, web, App, HttpResponse, Responder};
use serde_json::Value;

use blue_api::entities::image::ManageImagesRequest;
use blue_api::handlers::json_error::json_config;

#[post("/articles/{id}/images")]
async fn manage_stub(
    _article_id: web::Path<i64>,
    _data: web::Json<ManageImagesRequest>,
) -> impl Responder {
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn unknown_action_returns_a_structured_json_error() {
    let app = test::init_service(App::new().app_data(json_config()).service(manage_stub)).await;

    let req = test::TestRequest::post()
        .uri("/articles/1/images")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"action":"destroy","images":[]}"#)
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("destroy"));
}

#[actix_web::test]
async fn malformed_json_returns_a_structured_json_error() {
    let app = test::init_service(App::new().app_data(json_config()).service(manage_stub)).await;

    let req = test::TestRequest::post()
        .uri("/articles/1/images")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"action": "#)
        .to_request();

    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
}

#[actix_web::test]
async fn valid_body_still_deserializes() {
    let app = test::init_service(App::new().app_data(json_config()).service(manage_stub)).await;

    let req = test::TestRequest::post()
        .uri("/articles/1/images")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"action":"remove"}"#)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

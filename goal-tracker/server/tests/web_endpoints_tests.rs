use axum::http::{Method, StatusCode};
use insta::assert_snapshot;

mod common;

use common::send;

#[tokio::test]
async fn can_check_health_endpoint() {
    let ctx = common::setup().await.expect("Failed to setup test context");

    let response = send(&ctx.app, Method::GET, "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_snapshot!(&response.body, @"OK");
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let ctx = common::setup().await.expect("Failed to setup test context");

    let response = send(&ctx.app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let document = response.json();
    let paths = document["paths"].as_object().expect("document has no paths");
    for path in [
        "/goals",
        "/goals/{id}",
        "/goals/{id}/tasks",
        "/tasks",
        "/tasks/{id}",
        "/tasks/{id}/mark_complete",
        "/tasks/{id}/mark_incomplete",
    ] {
        assert!(paths.contains_key(path), "missing path {}", path);
    }
    assert!(document["paths"]["/tasks/{id}/mark_complete"]["patch"].is_object());
}

#[tokio::test]
async fn returns_not_found_for_unknown_routes() {
    let ctx = common::setup().await.expect("Failed to setup test context");

    let response = send(&ctx.app, Method::GET, "/projects", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

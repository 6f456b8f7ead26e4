//! Health and documentation endpoint tests.

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[cfg(unix)]
#[tokio::test]
async fn test_health_reports_installed_engine_and_queue() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["slicer"]["status"], "installed");
    assert_eq!(body["slicer"]["path"], "/bin/sh");
    assert_eq!(body["queue"]["pending"], 0);
    assert_eq!(body["queue"]["running"], false);
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app().await;
    let response = app.client().get("/health/live").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app().await;
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec: Value = response.json();
    assert!(spec["paths"]["/api/v0/slice"].is_object());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = setup_test_app().await;
    let response = app
        .client()
        .get("/health/live")
        .add_header("X-Request-ID", "trace-123")
        .await;
    assert_eq!(response.header("X-Request-ID"), "trace-123");
}

//! Upload API integration tests.
//!
//! Run with: `cargo test -p printquote-api --test uploads_test`

mod helpers;

use helpers::fixtures::{cube_stl, model_form};
use helpers::{api_path, setup_test_app};
use printquote_db::UploadRepository;
use serde_json::Value;

#[tokio::test]
async fn test_upload_model_returns_metadata() {
    let app = setup_test_app().await;
    let data = cube_stl(1000);
    let size = data.len() as u64;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(model_form("cube.stl", data))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["fileName"], "cube.stl");
    assert_eq!(body["fileSize"], size);
    assert_eq!(body["fileExtension"], "stl");
    assert!(body["fileId"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["expiresAt"].as_str().is_some());
}

#[tokio::test]
async fn test_upload_rejects_unsupported_extension() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(model_form("drawing.dxf", b"0\nSECTION\n".to_vec()))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_FILE_TYPE");
    assert_eq!(app.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = setup_test_app().await;

    // Limit is 1 MB; stay inside the multipart allowance so the service sees it.
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(model_form("big.stl", vec![b'a'; 1024 * 1024 + 10]))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(app.repository.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_upload_without_file_field_is_invalid() {
    let app = setup_test_app().await;

    let form = axum_test::multipart::MultipartForm::new().add_text("note", "no file here");
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_get_upload_round_trip_and_unknown_id() {
    let app = setup_test_app().await;
    let uploaded: Value = app
        .client()
        .post(&api_path("/uploads"))
        .multipart(model_form("part.3mf", b"PK\x03\x04".to_vec()))
        .await
        .json();
    let file_id = uploaded["fileId"].as_str().unwrap();

    let response = app
        .client()
        .get(&api_path(&format!("/uploads/{}", file_id)))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["fileExtension"], "3mf");

    let response = app
        .client()
        .get(&api_path("/uploads/1700000000000_nope1234"))
        .await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

//! Asset API integration tests.
//!
//! Run with: `cargo test -p vibe-api --test assets_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::auth::{register_test_user, TestUser};
use helpers::storage::MemoryStorage;
use helpers::{bearer, setup_test_app, setup_test_app_with_storage, TEST_MAX_UPLOAD_BYTES};
use serde_json::json;

async fn record_asset(client: &TestServer, user: &TestUser, name: &str) -> i64 {
    let response = client
        .post("/api/assets/assets")
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({
            "asset_name": name,
            "asset_type": "video",
            "storage_provider": "backblaze",
            "file_path": "https://f000.backblazeb2.com/file/bucket/videos/clip.mp4"
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json::<serde_json::Value>()["asset_id"]
        .as_i64()
        .expect("asset id")
}

#[tokio::test]
async fn test_record_and_get_asset() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let id = record_asset(client, &user, "clip.mp4").await;

    let response = client
        .get(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["asset_name"], "clip.mp4");
    assert_eq!(body["storage_provider"], "backblaze");
    // No backend configured, so the stored URL comes back unsigned
    assert_eq!(body["download_url"], body["file_path"]);
}

#[tokio::test]
async fn test_record_asset_missing_data() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post("/api/assets/assets")
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"asset_name": "half.mp4", "asset_type": "video"}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>()["error"],
        "Missing required asset data"
    );
}

#[tokio::test]
async fn test_list_update_delete_asset() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let id = record_asset(client, &user, "a.mp4").await;
    record_asset(client, &user, "b.mp4").await;

    let listed: Vec<serde_json::Value> = client
        .get("/api/assets/assets")
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(listed.len(), 2);

    let updated = client
        .put(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"asset_name": "renamed.mp4", "asset_metadata": {"duration": 12}}))
        .await;
    assert_eq!(updated.status_code(), 200);
    assert_eq!(
        updated.json::<serde_json::Value>()["msg"],
        "Asset updated successfully"
    );

    let body: serde_json::Value = client
        .get(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(body["asset_name"], "renamed.mp4");
    assert_eq!(body["asset_metadata"]["duration"], 12);

    let deleted = client
        .delete(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(deleted.status_code(), 200);

    let missing = client
        .get(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_upload_without_backend_is_unavailable() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let form = MultipartForm::new()
        .add_text("asset_type", "video")
        .add_part(
            "file",
            Part::bytes(vec![0u8; 1024])
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        );

    let response = client
        .post("/api/assets/assets/upload")
        .add_header("Authorization", bearer(&user.token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 503);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let form = MultipartForm::new().add_text("asset_type", "video");

    let response = client
        .post("/api/assets/assets/upload")
        .add_header("Authorization", bearer(&user.token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<serde_json::Value>()["error"], "No file provided");
}

#[tokio::test]
async fn test_upload_filename_too_long() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 16])
            .file_name(format!("{}.mp4", "x".repeat(300)))
            .mime_type("video/mp4"),
    );

    let response = client
        .post("/api/assets/assets/upload")
        .add_header("Authorization", bearer(&user.token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>()["error"],
        "Filename must be at most 255 characters"
    );
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; TEST_MAX_UPLOAD_BYTES + 1])
            .file_name("big.mp4")
            .mime_type("video/mp4"),
    );

    let response = client
        .post("/api/assets/assets/upload")
        .add_header("Authorization", bearer(&user.token))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), 413);
}

async fn upload_clip(client: &TestServer, user: &TestUser) -> (i64, String) {
    let form = MultipartForm::new()
        .add_text("file_type", "editor_video")
        .add_part(
            "file",
            Part::bytes(vec![7u8; 512])
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        );

    let response = client
        .post("/api/assets/assets/upload")
        .add_header("Authorization", bearer(&user.token))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201, "upload failed: {}", response.text());

    let body: serde_json::Value = response.json();
    (
        body["asset_id"].as_i64().expect("asset id"),
        body["file"]["download_url"]
            .as_str()
            .expect("download url")
            .to_string(),
    )
}

#[tokio::test]
async fn test_uploaded_asset_is_signed_and_removed_on_delete() {
    let storage = MemoryStorage::new();
    let app = setup_test_app_with_storage(storage.manager()).await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let (id, url) = upload_clip(client, &user).await;
    assert!(storage.contains(&url));

    let body: serde_json::Value = client
        .get(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(body["download_url"], format!("{}?signature=test", url));

    let deleted = client
        .delete(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(deleted.status_code(), 200);
    assert!(!storage.contains(&url));
}

#[tokio::test]
async fn test_registered_url_never_touches_another_users_file() {
    let storage = MemoryStorage::new();
    let app = setup_test_app_with_storage(storage.manager()).await;
    let client = app.client();
    let owner = register_test_user(client, Some("owner@example.com"), None).await;
    let intruder = register_test_user(client, Some("intruder@example.com"), None).await;
    let (_, url) = upload_clip(client, &owner).await;

    let response = client
        .post("/api/assets/assets")
        .add_header("Authorization", bearer(&intruder.token))
        .json(&json!({
            "asset_name": "borrowed.mp4",
            "asset_type": "video",
            "storage_provider": "cloudinary",
            "file_path": url
        }))
        .await;
    assert_eq!(response.status_code(), 201);
    let id = response.json::<serde_json::Value>()["asset_id"]
        .as_i64()
        .expect("asset id");

    let body: serde_json::Value = client
        .get(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&intruder.token))
        .await
        .json();
    assert_eq!(body["download_url"], url.as_str());

    let deleted = client
        .delete(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&intruder.token))
        .await;
    assert_eq!(deleted.status_code(), 200);
    assert!(storage.contains(&url));
}

#[tokio::test]
async fn test_repointed_upload_is_not_deleted_remotely() {
    let storage = MemoryStorage::new();
    let app = setup_test_app_with_storage(storage.manager()).await;
    let client = app.client();
    let owner = register_test_user(client, Some("owner@example.com"), None).await;
    let intruder = register_test_user(client, Some("intruder@example.com"), None).await;
    let (_, owner_url) = upload_clip(client, &owner).await;
    let (id, intruder_url) = upload_clip(client, &intruder).await;

    let updated = client
        .put(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&intruder.token))
        .json(&json!({"file_path": owner_url}))
        .await;
    assert_eq!(updated.status_code(), 200);

    let deleted = client
        .delete(&format!("/api/assets/assets/{}", id))
        .add_header("Authorization", bearer(&intruder.token))
        .await;
    assert_eq!(deleted.status_code(), 200);
    assert!(storage.contains(&owner_url));
    // Orphaned once the row stopped pointing at it
    assert!(storage.contains(&intruder_url));
}

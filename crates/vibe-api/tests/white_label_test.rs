//! White-label API integration tests.
//!
//! Run with: `cargo test -p vibe-api --test white_label_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::register_test_user;
use helpers::{bearer, setup_test_app};
use serde_json::json;

const PATH: &str = "/api/white-label/white_label_config";

#[tokio::test]
async fn test_create_get_update_delete_config() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let created = client
        .post(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({
            "custom_domain": "video.brand.test",
            "primary_color": "#112233",
            "contact_email": "hello@brand.test"
        }))
        .await;
    assert_eq!(created.status_code(), 201);
    let body: serde_json::Value = created.json();
    assert_eq!(body["msg"], "White label config created successfully");
    assert_eq!(body["config"]["domain_verified"], false);

    let fetched: serde_json::Value = client
        .get(PATH)
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(fetched["custom_domain"], "video.brand.test");

    let updated = client
        .put(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"secondary_color": "#abcdef"}))
        .await;
    assert_eq!(updated.status_code(), 200);
    let body: serde_json::Value = updated.json();
    assert_eq!(body["config"]["secondary_color"], "#abcdef");
    assert_eq!(body["config"]["primary_color"], "#112233");

    let deleted = client
        .delete(PATH)
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(deleted.status_code(), 200);

    let missing = client
        .get(PATH)
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(missing.status_code(), 404);
    assert_eq!(
        missing.json::<serde_json::Value>()["error"],
        "White label config not found"
    );
}

#[tokio::test]
async fn test_create_requires_domain() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"logo_url": "https://cdn.test/logo.png"}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<serde_json::Value>()["error"], "Missing custom domain");
}

#[tokio::test]
async fn test_invalid_color_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"custom_domain": "a.test", "primary_color": "red"}))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_domain_taken_by_another_user() {
    let app = setup_test_app().await;
    let client = app.client();
    let alice = register_test_user(client, Some("alice@example.com"), None).await;
    let bob = register_test_user(client, Some("bob@example.com"), None).await;

    let first = client
        .post(PATH)
        .add_header("Authorization", bearer(&alice.token))
        .json(&json!({"custom_domain": "shared.test"}))
        .await;
    assert_eq!(first.status_code(), 201);

    let second = client
        .post(PATH)
        .add_header("Authorization", bearer(&bob.token))
        .json(&json!({"custom_domain": "shared.test"}))
        .await;
    assert_eq!(second.status_code(), 409);
}

#[tokio::test]
async fn test_verified_domain_brands_index() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    client
        .post(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"custom_domain": "studio.brand.test", "primary_color": "#ff0000"}))
        .await;

    let unverified: serde_json::Value = client
        .get("/")
        .add_header("Host", "studio.brand.test")
        .await
        .json();
    assert!(unverified.get("white_label").is_none());

    let verified = client
        .put(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"domain_verified": true}))
        .await;
    assert_eq!(verified.status_code(), 200);

    let branded: serde_json::Value = client
        .get("/")
        .add_header("Host", "studio.brand.test:443")
        .await
        .json();
    assert_eq!(branded["white_label"]["primary_color"], "#ff0000");

    let deleted = client
        .delete(PATH)
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(deleted.status_code(), 200);

    let unbranded: serde_json::Value = client
        .get("/")
        .add_header("Host", "studio.brand.test")
        .await
        .json();
    assert!(unbranded.get("white_label").is_none());
}

#[tokio::test]
async fn test_contact_email_longer_than_column_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let email = format!("{}@{}.example.com", "a".repeat(60), "b".repeat(60));

    let response = client
        .post(PATH)
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"custom_domain": "long.brand.test", "contact_email": email}))
        .await;

    assert_eq!(response.status_code(), 400);
}

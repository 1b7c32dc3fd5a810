//! Account API integration tests.
//!
//! Run with: `cargo test -p vibe-api --test auth_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::{register_test_user, TEST_PASSWORD};
use helpers::{bearer, setup_test_app};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let app = setup_test_app().await;
    let client = app.client();

    let user = register_test_user(client, Some("new@example.com"), None).await;

    assert!(user.user_id > 0);
    assert!(!user.token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    register_test_user(client, Some("dup@example.com"), None).await;

    let response = client
        .post("/api/auth/register")
        .json(&json!({"email": "dup@example.com", "password": "another"}))
        .await;

    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/auth/register")
        .json(&json!({"email": "only@example.com"}))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email and password required");
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post("/api/auth/login")
        .json(&json!({"email": user.email, "password": user.password}))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user.user_id);
    assert_eq!(body["user"]["subscription_plan"], "free");
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post("/api/auth/login")
        .json(&json!({"email": user.email, "password": format!("{}x", TEST_PASSWORD)}))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_is_401() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/auth/login")
        .json(&json!({"email": "ghost@example.com", "password": "whatever"}))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_profile_returns_current_user() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .get("/api/auth/profile")
        .add_header("Authorization", bearer(&user.token))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["email"], user.email);
    assert_eq!(body["user"]["storage_used_gb"], 0.0);
}

#[tokio::test]
async fn test_profile_rejects_forged_token() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/api/auth/profile")
        .add_header("Authorization", bearer("eyJhbGciOiJIUzI1NiJ9.e30.invalid"))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_register_email_longer_than_column_is_400() {
    let app = setup_test_app().await;
    let email = format!("{}@{}.example.com", "a".repeat(60), "b".repeat(60));

    let response = app
        .client()
        .post("/api/auth/register")
        .json(&json!({"email": email, "password": TEST_PASSWORD}))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_repeated_login_failures_are_limited() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let wrong = json!({"email": user.email, "password": "not-the-password"});

    for _ in 0..10 {
        let response = client.post("/api/auth/login").json(&wrong).await;
        assert_eq!(response.status_code(), 401);
    }

    // Blocked even with the right password until the window passes
    let response = client
        .post("/api/auth/login")
        .json(&json!({"email": user.email, "password": user.password}))
        .await;
    assert_eq!(response.status_code(), 429);
    assert_eq!(
        response.json::<serde_json::Value>()["code"],
        "TOO_MANY_REQUESTS"
    );
}

#[tokio::test]
async fn test_repeated_bad_tokens_are_limited() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    for _ in 0..10 {
        let response = client
            .get("/api/auth/profile")
            .add_header("Authorization", bearer("not-a-jwt"))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    let response = client
        .get("/api/auth/profile")
        .add_header("Authorization", bearer(&user.token))
        .await;
    assert_eq!(response.status_code(), 429);
}

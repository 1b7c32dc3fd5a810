//! Subscription API integration tests.
//!
//! Run with: `cargo test -p vibe-api --test subscriptions_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum_test::TestServer;
use helpers::auth::register_test_user;
use helpers::{bearer, setup_test_app};
use serde_json::json;

async fn plan_id(client: &TestServer, name: &str) -> i64 {
    let plans: Vec<serde_json::Value> = client.get("/api/subscriptions/subscription_plans").await.json();
    plans
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_i64())
        .expect("seeded plan")
}

#[tokio::test]
async fn test_plans_are_public_and_seeded() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/subscriptions/subscription_plans").await;

    assert_eq!(response.status_code(), 200);
    let plans: Vec<serde_json::Value> = response.json();
    let names: Vec<&str> = plans.iter().filter_map(|p| p["name"].as_str()).collect();
    assert_eq!(names, vec!["free", "basic", "pro", "enterprise"]);
    let white_label: Vec<&str> = plans
        .iter()
        .filter(|p| p["allows_white_labeling"] == true)
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(white_label, vec!["enterprise"]);
}

#[tokio::test]
async fn test_subscribe_moves_user_to_plan() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let pro = plan_id(client, "pro").await;

    let response = client
        .post("/api/subscriptions/subscribe")
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"plan_id": pro, "amount": 29.99, "transaction_id": "txn_001"}))
        .await;
    assert_eq!(response.status_code(), 201);
    assert_eq!(
        response.json::<serde_json::Value>()["msg"],
        "Subscription successful"
    );

    let profile: serde_json::Value = client
        .get("/api/auth/profile")
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(profile["user"]["subscription_plan"], "pro");

    let transactions: Vec<serde_json::Value> = client
        .get("/api/subscriptions/transactions")
        .add_header("Authorization", bearer(&user.token))
        .await
        .json();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["plan_name"], "Pro");
    assert_eq!(transactions[0]["status"], "completed");
}

#[tokio::test]
async fn test_subscribe_missing_data() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post("/api/subscriptions/subscribe")
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"plan_id": 1}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<serde_json::Value>()["error"],
        "Missing required subscription data"
    );
}

#[tokio::test]
async fn test_subscribe_unknown_plan() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;

    let response = client
        .post("/api/subscriptions/subscribe")
        .add_header("Authorization", bearer(&user.token))
        .json(&json!({"plan_id": 9999, "amount": 10, "transaction_id": "txn_x"}))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_duplicate_transaction_id_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = register_test_user(client, None, None).await;
    let basic = plan_id(client, "basic").await;
    let body = json!({"plan_id": basic, "amount": 9.99, "transaction_id": "txn_same"});

    let first = client
        .post("/api/subscriptions/subscribe")
        .add_header("Authorization", bearer(&user.token))
        .json(&body)
        .await;
    assert_eq!(first.status_code(), 201);

    let second = client
        .post("/api/subscriptions/subscribe")
        .add_header("Authorization", bearer(&user.token))
        .json(&body)
        .await;
    assert_eq!(second.status_code(), 409);
}

use axum_test::TestServer;
use serde_json::json;

/// Registered test account with a valid access token.
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub user_id: i64,
    pub token: String,
}

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Register through the API; email defaults to `test@example.com`.
pub async fn register_test_user(
    client: &TestServer,
    email: Option<&str>,
    password: Option<&str>,
) -> TestUser {
    let email = email.unwrap_or("test@example.com").to_string();
    let password = password.unwrap_or(TEST_PASSWORD).to_string();

    let response = client
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": password,
            "first_name": "Test",
            "last_name": "User",
        }))
        .await;
    assert_eq!(response.status_code(), 201, "registration failed: {}", response.text());

    let body: serde_json::Value = response.json();
    TestUser {
        email,
        password,
        user_id: body["user"]["id"].as_i64().expect("user id in response"),
        token: body["access_token"]
            .as_str()
            .expect("access token in response")
            .to_string(),
    }
}

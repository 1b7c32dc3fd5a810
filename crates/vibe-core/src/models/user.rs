use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_plan: String,
    pub storage_used_gb: f64,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for registration. Required fields are optional here so the
/// handler can answer with the API's own missing-field message.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        email(message = "Invalid email address"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 characters"))]
    pub password: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of a user returned by login and registration
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_plan: String,
}

/// Profile view, adds storage usage
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_plan: String,
    pub storage_used_gb: f64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            subscription_plan: user.subscription_plan.clone(),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            subscription_plan: user.subscription_plan,
            storage_used_gb: user.storage_used_gb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some("secret".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_register_email_must_fit_column() {
        assert!(register("editor@example.com").validate().is_ok());

        let long = format!("{}@{}.example.com", "a".repeat(60), "b".repeat(60));
        assert!(long.len() > 120);
        assert!(register(&long).validate().is_err());
    }
}

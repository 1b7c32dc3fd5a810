//! Account handlers: login, registration and profile

use crate::auth::middleware::too_many_attempts;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;
use vibe_core::models::{LoginRequest, RegisterRequest, UserProfile, UserResponse};
use vibe_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: &'static str,
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// Trimmed, non-empty field value
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Email and password required", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 429, description = "Too many failed attempts from this address", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, client_ip, request), fields(client_ip = %client_ip.0))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    client_ip: ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, HttpAppError> {
    let (Some(email), Some(password)) = (required(&request.email), request.password.as_deref())
    else {
        return Err(AppError::BadRequest("Email and password required".to_string()).into());
    };
    if password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".to_string()).into());
    }

    let ClientIp(ip) = client_ip;
    if state.auth_failures.is_blocked(&ip).await {
        return Ok(too_many_attempts());
    }

    let user = state
        .db
        .users
        .find_by_email(email)
        .await?
        .filter(|user| verify_password(password, &user.password_hash));
    let Some(user) = user else {
        if state.auth_failures.record_failure(&ip).await {
            tracing::warn!(client_ip = %ip, "Auth failure limit reached");
        }
        return Err(AppError::Unauthorized("Invalid email or password".to_string()).into());
    };

    let access_token = state.jwt.issue(user.id)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful",
        access_token,
        user: UserResponse::from(&user),
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 409, description = "User already exists", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (Some(email), Some(password)) = (required(&request.email), request.password.as_deref())
    else {
        return Err(AppError::BadRequest("Email and password required".to_string()).into());
    };
    if password.is_empty() {
        return Err(AppError::BadRequest("Email and password required".to_string()).into());
    }
    request.validate()?;

    let password_hash = hash_password(password)?;
    let user = state
        .db
        .users
        .create_user(
            email,
            &password_hash,
            required(&request.first_name),
            required(&request.last_name),
        )
        .await?;

    let access_token = state.jwt.issue(user.id)?;
    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful",
            access_token,
            user: UserResponse::from(&user),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .users
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: UserProfile::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required(&None), None);
        assert_eq!(required(&Some("   ".to_string())), None);
        assert_eq!(required(&Some(" a@b.co ".to_string())), Some("a@b.co"));
    }
}

//! White-label configuration for the caller's account

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;
use vibe_core::models::{CreateWhiteLabelRequest, UpdateWhiteLabelRequest, WhiteLabelConfig};
use vibe_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct WhiteLabelResponse {
    pub msg: &'static str,
    pub config: WhiteLabelConfig,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WhiteLabelDeletedResponse {
    pub msg: &'static str,
}

fn config_not_found() -> AppError {
    AppError::NotFound("White label config not found".to_string())
}

#[utoipa::path(
    post,
    path = "/api/white-label/white_label_config",
    tag = "white-label",
    request_body = CreateWhiteLabelRequest,
    responses(
        (status = 201, description = "Configuration created", body = WhiteLabelResponse),
        (status = 400, description = "Missing custom domain or invalid field", body = ErrorResponse),
        (status = 409, description = "Config exists or domain in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn create_config(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateWhiteLabelRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(domain) = request
        .custom_domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    else {
        return Err(AppError::BadRequest("Missing custom domain".to_string()).into());
    };
    request.validate()?;

    let config = state
        .db
        .white_labels
        .create_config(auth.user_id, domain, &request)
        .await?;
    state.white_label_cache.clear().await;

    tracing::info!(domain = %config.custom_domain, "White label config created");
    Ok((
        StatusCode::CREATED,
        Json(WhiteLabelResponse {
            msg: "White label config created successfully",
            config,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/white-label/white_label_config",
    tag = "white-label",
    responses(
        (status = 200, description = "The caller's configuration", body = WhiteLabelConfig),
        (status = 404, description = "No configuration", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let config = state
        .db
        .white_labels
        .get_for_user(auth.user_id)
        .await?
        .ok_or_else(config_not_found)?;

    Ok(Json(config))
}

#[utoipa::path(
    put,
    path = "/api/white-label/white_label_config",
    tag = "white-label",
    request_body = UpdateWhiteLabelRequest,
    responses(
        (status = 200, description = "Configuration updated", body = WhiteLabelResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "No configuration", body = ErrorResponse),
        (status = 409, description = "Domain in use", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateWhiteLabelRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let config = state
        .db
        .white_labels
        .update_config(auth.user_id, &request)
        .await?
        .ok_or_else(config_not_found)?;
    state.white_label_cache.clear().await;

    Ok(Json(WhiteLabelResponse {
        msg: "White label config updated successfully",
        config,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/white-label/white_label_config",
    tag = "white-label",
    responses(
        (status = 200, description = "Configuration deleted", body = WhiteLabelDeletedResponse),
        (status = 404, description = "No configuration", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn delete_config(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.white_labels.delete_config(auth.user_id).await? {
        return Err(config_not_found().into());
    }
    state.white_label_cache.clear().await;

    Ok(Json(WhiteLabelDeletedResponse {
        msg: "White label config deleted successfully",
    }))
}

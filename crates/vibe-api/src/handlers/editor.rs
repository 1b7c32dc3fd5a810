//! Editor actions. Each one records its status in the project's editor document.

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::projects::MessageResponse;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;
use vibe_core::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub asset_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub processing_options: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderVideoRequest {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub render_settings: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportVideoRequest {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub export_format: Option<String>,
}

/// Merge `patch` into the caller's project, 404 when it is not theirs
async fn record_status(
    state: &AppState,
    user_id: i64,
    project_id: i64,
    patch: Value,
) -> Result<(), AppError> {
    state
        .db
        .projects
        .merge_project_data(user_id, project_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/editor/process_video",
    tag = "editor",
    request_body = ProcessVideoRequest,
    responses(
        (status = 200, description = "Processing initiated", body = MessageResponse),
        (status = 400, description = "Missing project ID or asset IDs", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ProcessVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset_ids = request.asset_ids.unwrap_or_default();
    let Some(project_id) = request.project_id.filter(|_| !asset_ids.is_empty()) else {
        return Err(AppError::BadRequest("Missing project ID or asset IDs".to_string()).into());
    };

    record_status(
        &state,
        auth.user_id,
        project_id,
        json!({
            "last_processed": Utc::now().to_rfc3339(),
            "processing_status": "initiated",
        }),
    )
    .await?;

    tracing::info!(
        project_id,
        asset_count = asset_ids.len(),
        has_options = request.processing_options.is_some(),
        "Video processing initiated"
    );
    Ok(Json(MessageResponse {
        msg: "Video processing initiated successfully",
    }))
}

#[utoipa::path(
    post,
    path = "/api/editor/render_video",
    tag = "editor",
    request_body = RenderVideoRequest,
    responses(
        (status = 200, description = "Rendering initiated", body = MessageResponse),
        (status = 400, description = "Missing project ID", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn render_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<RenderVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(project_id) = request.project_id else {
        return Err(AppError::BadRequest("Missing project ID".to_string()).into());
    };

    let mut patch = Map::new();
    patch.insert("rendering_status".to_string(), json!("initiated"));
    if let Some(settings) = request.render_settings {
        patch.insert("render_settings".to_string(), settings);
    }
    record_status(&state, auth.user_id, project_id, Value::Object(patch)).await?;

    tracing::info!(project_id, "Video rendering initiated");
    Ok(Json(MessageResponse {
        msg: "Video rendering initiated successfully",
    }))
}

#[utoipa::path(
    post,
    path = "/api/editor/export_video",
    tag = "editor",
    request_body = ExportVideoRequest,
    responses(
        (status = 200, description = "Export initiated", body = MessageResponse),
        (status = 400, description = "Missing project ID or export format", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn export_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ExportVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let export_format = request
        .export_format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty());
    let (Some(project_id), Some(export_format)) = (request.project_id, export_format) else {
        return Err(
            AppError::BadRequest("Missing project ID or export format".to_string()).into(),
        );
    };

    record_status(
        &state,
        auth.user_id,
        project_id,
        json!({
            "export_status": "initiated",
            "export_format": export_format,
        }),
    )
    .await?;

    tracing::info!(project_id, export_format, "Video export initiated");
    Ok(Json(MessageResponse {
        msg: "Video export initiated successfully",
    }))
}

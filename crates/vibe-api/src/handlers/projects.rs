//! Editor project handlers

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;
use vibe_core::models::{
    CreateProjectRequest, ProjectDetail, ProjectSummary, ProjectType, UpdateProjectRequest,
};
use vibe_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectCreatedResponse {
    pub msg: &'static str,
    pub project_id: i64,
}

/// Plain acknowledgement used by update/delete style endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub msg: &'static str,
}

fn parse_project_type(value: &str) -> Result<ProjectType, AppError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))
}

fn project_not_found() -> AppError {
    AppError::NotFound("Project not found".to_string())
}

#[utoipa::path(
    post,
    path = "/api/projects/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectCreatedResponse),
        (status = 400, description = "Missing project name or type", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = request.project_name.as_deref().map(str::trim).unwrap_or("");
    let project_type = request.project_type.as_deref().unwrap_or("");
    if name.is_empty() || project_type.is_empty() {
        return Err(AppError::BadRequest("Missing project name or type".to_string()).into());
    }
    request.validate()?;
    let project_type = parse_project_type(project_type)?;

    let project = state
        .db
        .projects
        .create_project(auth.user_id, name, project_type)
        .await?;

    tracing::info!(project_id = project.id, project_type = %project_type, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(ProjectCreatedResponse {
            msg: "Project created successfully",
            project_id: project.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/projects/projects",
    tag = "projects",
    responses(
        (status = 200, description = "The caller's projects", body = Vec<ProjectSummary>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let projects = state.db.projects.list_projects(auth.user_id).await?;
    let response: Vec<ProjectSummary> = projects.into_iter().map(ProjectSummary::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/projects/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project with its editor document", body = ProjectDetail),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .db
        .projects
        .get_project(auth.user_id, id)
        .await?
        .ok_or_else(project_not_found)?;

    Ok(Json(ProjectDetail::from(project)))
}

#[utoipa::path(
    put,
    path = "/api/projects/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = MessageResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    let project_type = request
        .project_type
        .as_deref()
        .map(parse_project_type)
        .transpose()?;

    state
        .db
        .projects
        .update_project(
            auth.user_id,
            id,
            request.project_name.as_deref(),
            project_type,
            request.project_data.as_ref(),
        )
        .await?
        .ok_or_else(project_not_found)?;

    Ok(Json(MessageResponse {
        msg: "Project updated successfully",
    }))
}

#[utoipa::path(
    delete,
    path = "/api/projects/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.projects.delete_project(auth.user_id, id).await? {
        return Err(project_not_found().into());
    }

    tracing::info!(project_id = id, "Project deleted");
    Ok(Json(MessageResponse {
        msg: "Project deleted successfully",
    }))
}

//! Asset handlers: metadata records plus multipart upload through the storage manager

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::projects::MessageResponse;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;
use vibe_core::constants::BYTES_PER_GB;
use vibe_core::validation::MAX_FILENAME_LEN;
use vibe_core::models::{
    AssetChanges, AssetDetail, AssetSummary, AssetType, CreateAssetRequest, NewAsset,
    UpdateAssetRequest,
};
use vibe_core::{AppError, StorageProvider};
use vibe_storage::{FileUpload, StoredFile};

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetCreatedResponse {
    pub msg: &'static str,
    pub asset_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AssetUploadedResponse {
    pub msg: &'static str,
    pub asset_id: i64,
    pub file: StoredFile,
}

fn asset_not_found() -> AppError {
    AppError::NotFound("Asset not found".to_string())
}

fn parse_asset_type(value: &str) -> Result<AssetType, AppError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))
}

fn parse_provider(value: &str) -> Result<StorageProvider, AppError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/assets/assets",
    tag = "assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset recorded", body = AssetCreatedResponse),
        (status = 400, description = "Missing required asset data", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (Some(name), Some(asset_type), Some(provider), Some(file_path)) = (
        non_empty(&request.asset_name),
        non_empty(&request.asset_type),
        non_empty(&request.storage_provider),
        non_empty(&request.file_path),
    ) else {
        return Err(AppError::BadRequest("Missing required asset data".to_string()).into());
    };
    request.validate()?;

    let new_asset = NewAsset {
        user_id: auth.user_id,
        project_id: request.project_id,
        asset_name: name.to_string(),
        asset_type: parse_asset_type(asset_type)?,
        storage_provider: parse_provider(provider)?,
        file_path: file_path.to_string(),
        file_size: None,
        asset_metadata: serde_json::json!({}),
        storage_managed: false,
    };
    let asset = state.db.assets.create_asset(&new_asset).await?;

    tracing::info!(asset_id = asset.id, "Asset recorded");
    Ok((
        StatusCode::CREATED,
        Json(AssetCreatedResponse {
            msg: "Asset uploaded successfully",
            asset_id: asset.id,
        }),
    ))
}

/// Fields collected from an asset upload form
#[derive(Default)]
struct UploadForm {
    filename: Option<String>,
    content_type: Option<String>,
    data: Option<Bytes>,
    file_type: Option<String>,
    asset_type: Option<String>,
    project_id: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.filename = field.file_name().map(str::to_string);
                form.content_type = field.content_type().map(str::to_string);
                form.data = Some(field.bytes().await.map_err(multipart_error)?);
            }
            "file_type" => form.file_type = Some(field.text().await.map_err(multipart_error)?),
            "asset_type" => form.asset_type = Some(field.text().await.map_err(multipart_error)?),
            "project_id" => form.project_id = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }
    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/assets/assets/upload",
    tag = "assets",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored and asset recorded"),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 503, description = "No storage service available", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = auth.user_id))]
pub async fn upload_asset(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart).await?;

    let Some(data) = form.data else {
        return Err(AppError::BadRequest("No file provided".to_string()).into());
    };
    let filename = form.filename.unwrap_or_default();
    if filename.trim().is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()).into());
    }
    if filename.chars().count() > MAX_FILENAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Filename must be at most {} characters",
            MAX_FILENAME_LEN
        ))
        .into());
    }
    if data.len() > state.media.max_upload_size_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB.",
            state.media.max_upload_size_bytes / 1024 / 1024
        ))
        .into());
    }

    let project_id = match non_empty(&form.project_id) {
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| AppError::BadRequest("Invalid project_id".to_string()))?,
        ),
        None => None,
    };
    let asset_type = match non_empty(&form.asset_type) {
        Some(raw) => parse_asset_type(raw)?,
        None => AssetType::from_content_type(form.content_type.as_deref().unwrap_or_default()),
    };
    let file_type = non_empty(&form.file_type).unwrap_or("auto").to_string();

    let upload = FileUpload {
        user_id: auth.user_id,
        file_type,
        filename: filename.clone(),
        content_type: form.content_type,
        data,
    };
    let stored = state.media.storage.upload_file(&upload).await?;

    let new_asset = NewAsset {
        user_id: auth.user_id,
        project_id,
        asset_name: filename,
        asset_type,
        storage_provider: stored.service,
        file_path: stored.download_url.clone(),
        file_size: Some(stored.file_size as i64),
        asset_metadata: stored.metadata.clone(),
        storage_managed: true,
    };
    let asset = match state.db.assets.create_asset(&new_asset).await {
        Ok(asset) => asset,
        Err(e) => {
            // The row was never written, so the remote copy is orphaned
            state
                .media
                .storage
                .delete_file(&stored.download_url, Some(stored.service))
                .await;
            return Err(e.into());
        }
    };

    if let Err(e) = state
        .db
        .users
        .add_storage_used(auth.user_id, stored.file_size as f64 / BYTES_PER_GB)
        .await
    {
        tracing::warn!(error = %e, "Failed to update storage usage");
    }

    tracing::info!(
        asset_id = asset.id,
        provider = %stored.service,
        size_bytes = stored.file_size,
        "Asset uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssetUploadedResponse {
            msg: "Asset uploaded successfully",
            asset_id: asset.id,
            file: stored,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/assets/assets",
    tag = "assets",
    responses(
        (status = 200, description = "The caller's assets", body = Vec<AssetSummary>)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = state.db.assets.list_assets(auth.user_id).await?;
    let response: Vec<AssetSummary> = assets.into_iter().map(AssetSummary::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/assets/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset with a signed download URL", body = AssetDetail),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .db
        .assets
        .get_asset(auth.user_id, id)
        .await?
        .ok_or_else(asset_not_found)?;

    // Client-registered paths may point anywhere, so only our own files get signed
    let download_url = if asset.storage_managed {
        state
            .media
            .storage
            .get_download_url(&asset.file_path, None)
            .await
    } else {
        asset.file_path.clone()
    };

    Ok(Json(AssetDetail::new(asset, download_url)))
}

#[utoipa::path(
    put,
    path = "/api/assets/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = MessageResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<UpdateAssetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let changes = AssetChanges {
        asset_name: request.asset_name,
        asset_type: request
            .asset_type
            .as_deref()
            .map(parse_asset_type)
            .transpose()?,
        storage_provider: request
            .storage_provider
            .as_deref()
            .map(parse_provider)
            .transpose()?,
        file_path: request.file_path,
        asset_metadata: request.asset_metadata,
    };

    state
        .db
        .assets
        .update_asset(auth.user_id, id, &changes)
        .await?
        .ok_or_else(asset_not_found)?;

    Ok(Json(MessageResponse {
        msg: "Asset updated successfully",
    }))
}

#[utoipa::path(
    delete,
    path = "/api/assets/assets/{id}",
    tag = "assets",
    params(("id" = i64, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset deleted", body = MessageResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .db
        .assets
        .delete_asset(auth.user_id, id)
        .await?
        .ok_or_else(asset_not_found)?;

    // Best effort: the row is already gone
    let removed = if asset.storage_managed {
        state
            .media
            .storage
            .delete_file(&asset.file_path, Some(asset.storage_provider))
            .await
    } else {
        false
    };
    tracing::info!(asset_id = id, remote_file_removed = removed, "Asset deleted");

    Ok(Json(MessageResponse {
        msg: "Asset deleted successfully",
    }))
}

//! Raw video uploads and the processing jobs run on them

use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use vibe_core::constants::{is_allowed_video_extension, BYTES_PER_GB};
use vibe_core::models::{NewUpload, ProcessVideoRequest, ProcessingStatus, UploadedVideo};
use vibe_core::validation::{file_extension, secure_filename};
use vibe_core::AppError;
use vibe_processing::{supported_formats as formats, ProcessingOptions, SupportedFormats};

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadVideoResponse {
    pub message: &'static str,
    pub data: UploadedVideo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessingStarted {
    pub job_id: Uuid,
    pub upload_id: Uuid,
    pub status: &'static str,
    pub progress: i32,
    pub estimated_time: &'static str,
    pub options: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessVideoResponse {
    pub message: &'static str,
    pub data: ProcessingStarted,
}

fn upload_not_found() -> AppError {
    AppError::NotFound("Upload not found".to_string())
}

#[utoipa::path(
    post,
    path = "/api/upload/video",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded", body = UploadVideoResponse),
        (status = 400, description = "Missing, invalid or oversized file", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(user_id = auth.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?;
        file = Some((filename, content_type, data));
        break;
    }

    let Some((filename, content_type, data)) = file else {
        return Err(AppError::BadRequest("No file provided".to_string()).into());
    };
    if filename.is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()).into());
    }
    let Some(extension) = file_extension(&filename).filter(|ext| is_allowed_video_extension(ext))
    else {
        return Err(AppError::BadRequest(
            "Invalid file type. Please upload a video file.".to_string(),
        )
        .into());
    };
    let max_bytes = state.media.max_upload_size_bytes;
    if data.len() > max_bytes {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {}MB.",
            max_bytes / 1024 / 1024
        ))
        .into());
    }

    let id = Uuid::new_v4();
    let stored_filename = format!("{}.{}", id, extension);
    let path = state.media.uploads.save(&stored_filename, &data).await?;

    // Metadata is a bonus; a file ffprobe cannot read is still accepted
    let video_info = match state.media.processor.get_video_info(&path).await {
        Ok(info) => serde_json::to_value(info).ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not analyze uploaded video");
            None
        }
    };

    let new_upload = NewUpload {
        id,
        user_id: auth.user_id,
        original_filename: secure_filename(&filename),
        stored_filename,
        file_path: path.to_string_lossy().into_owned(),
        file_size: data.len() as i64,
        content_type,
        video_info,
    };
    let upload = match state.db.uploads.create_upload(&new_upload).await {
        Ok(upload) => upload,
        Err(e) => {
            state.media.uploads.remove(&new_upload.stored_filename).await.ok();
            return Err(e.into());
        }
    };

    if let Err(e) = state
        .db
        .users
        .add_storage_used(auth.user_id, upload.file_size as f64 / BYTES_PER_GB)
        .await
    {
        tracing::warn!(error = %e, "Failed to update storage usage");
    }

    tracing::info!(
        upload_id = %upload.id,
        size_bytes = upload.file_size,
        "Video uploaded"
    );

    Ok(Json(UploadVideoResponse {
        message: "Video uploaded successfully",
        data: UploadedVideo::from(&upload),
    }))
}

#[utoipa::path(
    get,
    path = "/api/upload/status/{id}",
    tag = "upload",
    params(("id" = String, Path, description = "Upload ID or processing job ID")),
    responses(
        (status = 200, description = "Upload or job status", body = ProcessingStatus),
        (status = 404, description = "Upload not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = Uuid::parse_str(&id).map_err(|_| upload_not_found())?;

    if let Some(upload) = state.db.uploads.get_upload(auth.user_id, id).await? {
        return Ok(Json(ProcessingStatus::from(&upload)));
    }

    let job = state
        .db
        .uploads
        .get_job(auth.user_id, id)
        .await?
        .ok_or_else(upload_not_found)?;

    Ok(Json(ProcessingStatus::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/upload/process",
    tag = "upload",
    request_body = ProcessVideoRequest,
    responses(
        (status = 200, description = "Processing job queued", body = ProcessVideoResponse),
        (status = 400, description = "Upload ID required or invalid options", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 503, description = "Job queue is full", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(user_id = auth.user_id))]
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<ProcessVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(upload_id) = request.upload_id else {
        return Err(AppError::BadRequest("Upload ID required".to_string()).into());
    };

    let options = ProcessingOptions::from_value(request.options.as_ref())?;
    options.validate()?;

    state
        .db
        .uploads
        .get_upload(auth.user_id, upload_id)
        .await?
        .ok_or_else(upload_not_found)?;

    let raw_options = request
        .options
        .filter(|v| !v.is_null())
        .unwrap_or_else(|| serde_json::json!({}));
    let job = state
        .db
        .uploads
        .create_job(auth.user_id, upload_id, &raw_options)
        .await?;
    let job_id = job.id;

    if let Err(e) = state.jobs.submit(job) {
        let message = e.to_string();
        if let Err(e) = state.db.uploads.fail_job(job_id, &message).await {
            tracing::error!(error = %e, "Failed to record rejected job");
        }
        return Err(AppError::ServiceUnavailable(message).into());
    }

    Ok(Json(ProcessVideoResponse {
        message: "Video processing started",
        data: ProcessingStarted {
            job_id,
            upload_id,
            status: "processing",
            progress: 0,
            estimated_time: "2-5 minutes",
            options: raw_options,
        },
    }))
}

/// Formats accepted for upload and produced by processing
#[utoipa::path(
    get,
    path = "/api/upload/formats",
    tag = "upload",
    responses((status = 200, description = "Supported formats")),
    security(("bearer_auth" = []))
)]
pub async fn supported_formats(_auth: AuthUser) -> Json<SupportedFormats> {
    Json(formats())
}

use std::fmt::{Display, Formatter, Result as FmtResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "upload_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploaded,
    Failed,
}

/// A video file received through `/api/upload/video` and kept on local disk
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Upload {
    pub id: Uuid,
    pub user_id: i64,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub video_info: Option<serde_json::Value>,
    pub status: UploadStatus,
    pub created_at: DateTime<Utc>,
}

/// Values for a new upload row
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub id: Uuid,
    pub user_id: i64,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub video_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// FFmpeg work requested for an upload
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProcessingJob {
    pub id: Uuid,
    pub upload_id: Uuid,
    pub user_id: i64,
    pub status: JobStatus,
    pub progress: i32,
    pub options: serde_json::Value,
    pub output_path: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedVideo {
    pub id: Uuid,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub upload_time: DateTime<Utc>,
    pub user_id: i64,
    pub status: UploadStatus,
}

impl From<&Upload> for UploadedVideo {
    fn from(upload: &Upload) -> Self {
        UploadedVideo {
            id: upload.id,
            filename: upload.original_filename.clone(),
            file_path: upload.file_path.clone(),
            file_size: upload.file_size,
            upload_time: upload.created_at,
            user_id: upload.user_id,
            status: upload.status,
        }
    }
}

/// Progress report for either an upload or a processing job
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessingStatus {
    pub id: Uuid,
    pub status: String,
    pub progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Upload> for ProcessingStatus {
    fn from(upload: &Upload) -> Self {
        let (status, progress) = match upload.status {
            UploadStatus::Uploaded => ("completed", 100),
            UploadStatus::Failed => ("failed", 0),
        };
        ProcessingStatus {
            id: upload.id,
            status: status.to_string(),
            progress,
            output_path: None,
            error: None,
        }
    }
}

impl From<ProcessingJob> for ProcessingStatus {
    fn from(job: ProcessingJob) -> Self {
        ProcessingStatus {
            id: job.id,
            status: job.status.to_string(),
            progress: job.progress,
            output_path: job.output_path,
            error: job.error_message,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessVideoRequest {
    #[serde(default)]
    pub upload_id: Option<Uuid>,
    #[serde(default)]
    pub options: Option<serde_json::Value>,
}

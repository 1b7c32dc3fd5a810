//! Storage abstraction trait
//!
//! This module defines the `StorageService` trait that every cloud backend implements.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use vibe_core::{AppError, StorageProvider};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No storage service available")]
    NoServiceAvailable,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(format!("File not found: {}", msg)),
            StorageError::InvalidKey(msg) => {
                AppError::InvalidInput(format!("Invalid storage key: {}", msg))
            }
            StorageError::NoServiceAvailable => {
                AppError::ServiceUnavailable("No storage service available".to_string())
            }
            StorageError::IoError(e) => AppError::Internal(format!("Storage IO error: {}", e)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// A file to be stored, as received from the client
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub user_id: i64,
    /// Routing category such as `editor_video` or `user_avatar`
    pub file_type: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FileUpload {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    /// Object key (or Cloudinary public id) inside the provider
    pub file_name: String,
    pub download_url: String,
    pub file_size: u64,
    pub content_type: Option<String>,
    pub service: StorageProvider,
    pub metadata: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Human-readable description of an active backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub free_tier: String,
    pub use_case: String,
    pub status: String,
}

impl ServiceInfo {
    pub fn active(service: &str, free_tier: &str, use_case: &str) -> Self {
        ServiceInfo {
            service: service.to_string(),
            free_tier: free_tier.to_string(),
            use_case: use_case.to_string(),
            status: "active".to_string(),
        }
    }
}

/// Cloud storage backend
///
/// Backends address files by the URL they returned from `upload`, so callers
/// only ever persist that URL.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Which provider this backend talks to
    fn provider(&self) -> StorageProvider;

    /// Description used by the storage info endpoint
    fn service_info(&self) -> ServiceInfo;

    /// Store a file under a fresh unique key
    async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile>;

    /// Delete the file behind `file_url`. Returns `Ok(false)` when the URL does
    /// not identify a file of this backend.
    async fn delete(&self, file_url: &str) -> StorageResult<bool>;

    /// Time-limited download URL for `file_url`
    async fn signed_url(&self, file_url: &str, expires_in: Duration) -> StorageResult<String>;
}

use crate::keys::{is_safe_key, type_scoped_key};
use crate::traits::{FileUpload, ServiceInfo, StorageError, StorageResult, StorageService, StoredFile};
use async_trait::async_trait;
use http::Method;
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use serde_json::json;
use std::time::Duration;
use vibe_core::config::FirebaseConfig;
use vibe_core::StorageProvider;

const DOWNLOAD_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";

/// Firebase Storage, which is a Google Cloud Storage bucket underneath
#[derive(Clone)]
pub struct FirebaseStorage {
    store: GoogleCloudStorage,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(config: &FirebaseConfig) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::new()
            .with_service_account_path(config.credentials_path.clone())
            .with_bucket_name(config.storage_bucket.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(FirebaseStorage {
            store,
            bucket: config.storage_bucket.clone(),
        })
    }

    fn generate_url(&self, blob_name: &str) -> String {
        format!(
            "{}/{}/o/{}?alt=media",
            DOWNLOAD_BASE,
            self.bucket,
            urlencoding::encode(blob_name)
        )
    }
}

/// Blob name from a Firebase download URL (the url-decoded text between `/o/` and `?`)
pub(crate) fn extract_blob_name(file_url: &str) -> Option<String> {
    let (_, rest) = file_url.split_once("/o/")?;
    let encoded = rest.split('?').next().unwrap_or(rest);
    let decoded = urlencoding::decode(encoded).ok()?.into_owned();
    if is_safe_key(&decoded) {
        Some(decoded)
    } else {
        None
    }
}

#[async_trait]
impl StorageService for FirebaseStorage {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Firebase
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::active(
            "Firebase Storage",
            "5GB storage + 1GB daily download",
            "User avatars and shared resources",
        )
    }

    async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile> {
        let blob_name = type_scoped_key(file.user_id, &file.file_type, &file.filename);
        let size = file.size();
        let location = Path::from(blob_name.clone());
        let content_type = file.content_type_or_default().to_string();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.clone().into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(file.data.clone()), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %blob_name,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Firebase upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %blob_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Firebase upload successful"
        );

        Ok(StoredFile {
            success: true,
            file_id: Some(blob_name.clone()),
            public_id: None,
            download_url: self.generate_url(&blob_name),
            file_size: size,
            content_type: Some(content_type),
            service: StorageProvider::Firebase,
            metadata: json!({
                "bucket": self.bucket,
                "blob_name": blob_name,
                "original_filename": file.filename,
                "file_type": file.file_type,
                "user_id": file.user_id,
            }),
            file_name: blob_name,
            thumbnail_url: None,
        })
    }

    async fn delete(&self, file_url: &str) -> StorageResult<bool> {
        let Some(blob_name) = extract_blob_name(file_url) else {
            tracing::warn!(url = %file_url, "Could not extract Firebase blob name");
            return Ok(false);
        };
        let location = Path::from(blob_name.clone());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %blob_name,
                "Firebase delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(bucket = %self.bucket, key = %blob_name, "Firebase delete successful");
        Ok(true)
    }

    async fn signed_url(&self, file_url: &str, expires_in: Duration) -> StorageResult<String> {
        let blob_name = extract_blob_name(file_url)
            .ok_or_else(|| StorageError::InvalidKey(file_url.to_string()))?;
        let location = Path::from(blob_name);

        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(url.to_string())
    }
}

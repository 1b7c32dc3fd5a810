use crate::keys::{is_safe_key, user_scoped_key};
use crate::traits::{FileUpload, ServiceInfo, StorageError, StorageResult, StorageService, StoredFile};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use serde_json::json;
use std::time::Duration;
use vibe_core::config::BackblazeConfig;
use vibe_core::StorageProvider;

/// Backblaze B2 storage through its S3-compatible endpoint
#[derive(Clone)]
pub struct BackblazeStorage {
    store: AmazonS3,
    bucket: String,
    endpoint: String,
}

impl BackblazeStorage {
    pub fn new(config: &BackblazeConfig) -> StorageResult<Self> {
        let endpoint = Self::endpoint_for(&config.region);

        let store = AmazonS3Builder::new()
            .with_access_key_id(config.key_id.clone())
            .with_secret_access_key(config.application_key.clone())
            .with_region(config.region.clone())
            .with_bucket_name(config.bucket_name.clone())
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(BackblazeStorage {
            store,
            bucket: config.bucket_name.clone(),
            endpoint,
        })
    }

    fn endpoint_for(region: &str) -> String {
        format!("https://s3.{}.backblazeb2.com", region)
    }

    /// Path-style public URL: `{endpoint}/{bucket}/{key}`
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// Object key from a URL produced by `generate_url`. Also accepts the
    /// native `https://fXXX.backblazeb2.com/file/{bucket}/{key}` form.
    fn key_from_url(&self, file_url: &str) -> Option<String> {
        let without_query = file_url.split('?').next().unwrap_or(file_url);

        let path_prefix = format!("/{}/", self.bucket);
        let native_prefix = format!("/file/{}/", self.bucket);
        let key = without_query
            .find(&native_prefix)
            .map(|idx| &without_query[idx + native_prefix.len()..])
            .or_else(|| {
                without_query
                    .find(&path_prefix)
                    .map(|idx| &without_query[idx + path_prefix.len()..])
            })?;

        if is_safe_key(key) {
            Some(key.to_string())
        } else {
            None
        }
    }
}

#[async_trait]
impl StorageService for BackblazeStorage {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Backblaze
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::active(
            "Backblaze B2",
            "10GB storage + 1GB daily download",
            "AI Video Remix files",
        )
    }

    async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile> {
        let key = user_scoped_key(file.user_id, &file.file_type, &file.filename);
        let size = file.size();
        let location = Path::from(key.clone());
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

        let put_result = result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Backblaze upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Backblaze upload successful"
        );

        Ok(StoredFile {
            success: true,
            file_id: put_result.version.or(put_result.e_tag),
            public_id: None,
            download_url: self.generate_url(&key),
            file_name: key,
            file_size: size,
            content_type: Some(content_type),
            service: StorageProvider::Backblaze,
            metadata: json!({
                "bucket": self.bucket,
                "original_filename": file.filename,
                "file_type": file.file_type,
                "user_id": file.user_id,
            }),
            thumbnail_url: None,
        })
    }

    async fn delete(&self, file_url: &str) -> StorageResult<bool> {
        let Some(key) = self.key_from_url(file_url) else {
            tracing::warn!(url = %file_url, "URL does not reference this Backblaze bucket");
            return Ok(false);
        };
        let location = Path::from(key.clone());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Backblaze delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Backblaze delete successful"
        );

        Ok(true)
    }

    async fn signed_url(&self, file_url: &str, expires_in: Duration) -> StorageResult<String> {
        let key = self
            .key_from_url(file_url)
            .ok_or_else(|| StorageError::InvalidKey(file_url.to_string()))?;
        let location = Path::from(key.clone());

        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "Backblaze presign failed"
                );
                StorageError::BackendError(e.to_string())
            })?;

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> BackblazeStorage {
        BackblazeStorage::new(&BackblazeConfig {
            key_id: "key".to_string(),
            application_key: "secret".to_string(),
            bucket_name: "remix-bucket".to_string(),
            region: "us-west-004".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_generate_url() {
        let s = storage();
        assert_eq!(
            s.generate_url("5/remix_video/abc.mp4"),
            "https://s3.us-west-004.backblazeb2.com/remix-bucket/5/remix_video/abc.mp4"
        );
    }

    #[test]
    fn test_key_from_url() {
        let s = storage();
        let url = s.generate_url("5/remix_video/abc.mp4");
        assert_eq!(s.key_from_url(&url).as_deref(), Some("5/remix_video/abc.mp4"));

        let native = "https://f004.backblazeb2.com/file/remix-bucket/5/remix_audio/x.mp3";
        assert_eq!(s.key_from_url(native).as_deref(), Some("5/remix_audio/x.mp3"));

        let signed = format!("{}?X-Amz-Signature=abc", url);
        assert_eq!(s.key_from_url(&signed).as_deref(), Some("5/remix_video/abc.mp4"));
    }

    #[test]
    fn test_key_from_foreign_url() {
        let s = storage();
        assert!(s.key_from_url("https://res.cloudinary.com/demo/video/upload/a.mp4").is_none());
        assert!(s
            .key_from_url("https://s3.us-west-004.backblazeb2.com/remix-bucket/../x")
            .is_none());
    }

    #[test]
    fn test_service_info() {
        let info = storage().service_info();
        assert_eq!(info.service, "Backblaze B2");
        assert_eq!(info.status, "active");
    }
}

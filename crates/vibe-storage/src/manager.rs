//! Provider routing across the configured backends

use crate::traits::{FileUpload, ServiceInfo, StorageError, StorageResult, StorageService, StoredFile};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use vibe_core::constants::DOWNLOAD_URL_EXPIRY_SECS;
use vibe_core::StorageProvider;

/// Uploads above this size go to Cloudinary first when auto-selecting
const LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;
/// Uploads below this size go to Firebase first when auto-selecting
const SMALL_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Fallback order once routing preferences are exhausted
const FALLBACK_ORDER: [StorageProvider; 3] = [
    StorageProvider::Cloudinary,
    StorageProvider::Backblaze,
    StorageProvider::Firebase,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub backblaze: bool,
    pub cloudinary: bool,
    pub firebase: bool,
}

/// Holds whichever backends were configured and picks one per upload
#[derive(Clone, Default)]
pub struct StorageManager {
    backblaze: Option<Arc<dyn StorageService>>,
    cloudinary: Option<Arc<dyn StorageService>>,
    firebase: Option<Arc<dyn StorageService>>,
}

impl StorageManager {
    pub fn new(
        backblaze: Option<Arc<dyn StorageService>>,
        cloudinary: Option<Arc<dyn StorageService>>,
        firebase: Option<Arc<dyn StorageService>>,
    ) -> Self {
        StorageManager {
            backblaze,
            cloudinary,
            firebase,
        }
    }

    fn service(&self, provider: StorageProvider) -> Option<&Arc<dyn StorageService>> {
        match provider {
            StorageProvider::Backblaze => self.backblaze.as_ref(),
            StorageProvider::Cloudinary => self.cloudinary.as_ref(),
            StorageProvider::Firebase => self.firebase.as_ref(),
        }
    }

    fn is_available(&self, provider: StorageProvider) -> bool {
        self.service(provider).is_some()
    }

    pub fn has_any_service(&self) -> bool {
        StorageProvider::ALL.iter().any(|p| self.is_available(*p))
    }

    /// Choose the backend for a file of the given routing type and size
    pub fn select_provider(&self, file_type: &str, file_size: u64) -> Option<StorageProvider> {
        use StorageProvider::{Backblaze, Cloudinary, Firebase};

        let preferred: &[StorageProvider] = match file_type {
            "remix_video" | "remix_audio" | "remix_thumbnail" => &[Backblaze, Cloudinary],
            "editor_video" | "editor_audio" | "editor_image" | "project_export" => {
                &[Cloudinary, Backblaze]
            }
            "user_avatar" | "template_thumbnail" | "effect_preview" => {
                &[Firebase, Cloudinary, Backblaze]
            }
            _ => return self.auto_select(file_size),
        };

        preferred.iter().copied().find(|p| self.is_available(*p))
    }

    fn auto_select(&self, file_size: u64) -> Option<StorageProvider> {
        let preferred: &[StorageProvider] = if file_size > LARGE_FILE_BYTES {
            &[StorageProvider::Cloudinary, StorageProvider::Backblaze]
        } else if file_size < SMALL_FILE_BYTES {
            &[StorageProvider::Firebase]
        } else {
            &[]
        };

        preferred
            .iter()
            .chain(FALLBACK_ORDER.iter())
            .copied()
            .find(|p| self.is_available(*p))
    }

    pub async fn upload_file(&self, file: &FileUpload) -> StorageResult<StoredFile> {
        let provider = self
            .select_provider(&file.file_type, file.size())
            .ok_or(StorageError::NoServiceAvailable)?;
        let service = self
            .service(provider)
            .ok_or(StorageError::NoServiceAvailable)?;

        tracing::debug!(
            provider = %provider,
            file_type = %file.file_type,
            size_bytes = file.size(),
            "Routing upload"
        );

        service.upload(file).await
    }

    /// Delete a stored file. Never fails: unknown providers and backend errors
    /// are logged and reported as `false`.
    pub async fn delete_file(&self, file_url: &str, provider: Option<StorageProvider>) -> bool {
        let Some(provider) = provider.or_else(|| detect_provider(file_url)) else {
            tracing::warn!(url = %file_url, "Could not determine storage provider for URL");
            return false;
        };
        let Some(service) = self.service(provider) else {
            tracing::warn!(provider = %provider, "Storage provider not configured");
            return false;
        };

        match service.delete(file_url).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(error = %e, provider = %provider, url = %file_url, "Failed to delete stored file");
                false
            }
        }
    }

    /// Time-limited URL for a stored file, or the URL itself when it cannot be signed
    pub async fn get_download_url(&self, file_url: &str, expires_in: Option<Duration>) -> String {
        let expires_in =
            expires_in.unwrap_or_else(|| Duration::from_secs(DOWNLOAD_URL_EXPIRY_SECS));

        let Some(service) = detect_provider(file_url).and_then(|p| self.service(p)) else {
            return file_url.to_string();
        };

        match service.signed_url(file_url, expires_in).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, url = %file_url, "Failed to sign download URL");
                file_url.to_string()
            }
        }
    }

    pub fn get_service_status(&self) -> ServiceStatus {
        ServiceStatus {
            backblaze: self.backblaze.is_some(),
            cloudinary: self.cloudinary.is_some(),
            firebase: self.firebase.is_some(),
        }
    }

    pub fn get_storage_info(&self) -> BTreeMap<String, ServiceInfo> {
        StorageProvider::ALL
            .iter()
            .filter_map(|p| self.service(*p).map(|s| (p.to_string(), s.service_info())))
            .collect()
    }
}

/// Provider that issued a stored-file URL
pub fn detect_provider(file_url: &str) -> Option<StorageProvider> {
    let url = file_url.to_lowercase();
    if url.contains("backblazeb2.com") || url.contains("b2-api.com") {
        Some(StorageProvider::Backblaze)
    } else if url.contains("cloudinary.com") {
        Some(StorageProvider::Cloudinary)
    } else if url.contains("firebase") || url.contains("googleapis.com") {
        Some(StorageProvider::Firebase)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockService {
        provider: StorageProvider,
        fail: bool,
        deletes: AtomicUsize,
    }

    impl MockService {
        fn arc(provider: StorageProvider) -> Arc<dyn StorageService> {
            Arc::new(MockService {
                provider,
                fail: false,
                deletes: AtomicUsize::new(0),
            })
        }

        fn failing(provider: StorageProvider) -> Arc<dyn StorageService> {
            Arc::new(MockService {
                provider,
                fail: true,
                deletes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StorageService for MockService {
        fn provider(&self) -> StorageProvider {
            self.provider
        }

        fn service_info(&self) -> ServiceInfo {
            ServiceInfo::active(&self.provider.to_string(), "free", "tests")
        }

        async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile> {
            Ok(StoredFile {
                success: true,
                file_id: None,
                public_id: None,
                file_name: file.filename.clone(),
                download_url: format!("https://{}.example/{}", self.provider, file.filename),
                file_size: file.size(),
                content_type: file.content_type.clone(),
                service: self.provider,
                metadata: serde_json::json!({}),
                thumbnail_url: None,
            })
        }

        async fn delete(&self, _file_url: &str) -> StorageResult<bool> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StorageError::DeleteFailed("boom".to_string()))
            } else {
                Ok(true)
            }
        }

        async fn signed_url(&self, file_url: &str, _expires_in: Duration) -> StorageResult<String> {
            if self.fail {
                Err(StorageError::BackendError("boom".to_string()))
            } else {
                Ok(format!("{}?signed=1", file_url))
            }
        }
    }

    fn all_services() -> StorageManager {
        StorageManager::new(
            Some(MockService::arc(StorageProvider::Backblaze)),
            Some(MockService::arc(StorageProvider::Cloudinary)),
            Some(MockService::arc(StorageProvider::Firebase)),
        )
    }

    fn upload(file_type: &str, size: usize) -> FileUpload {
        FileUpload {
            user_id: 1,
            file_type: file_type.to_string(),
            filename: "clip.mp4".to_string(),
            content_type: Some("video/mp4".to_string()),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_routing_with_all_services() {
        let manager = all_services();
        assert_eq!(manager.select_provider("remix_video", 1), Some(StorageProvider::Backblaze));
        assert_eq!(manager.select_provider("editor_video", 1), Some(StorageProvider::Cloudinary));
        assert_eq!(manager.select_provider("project_export", 1), Some(StorageProvider::Cloudinary));
        assert_eq!(manager.select_provider("user_avatar", 1), Some(StorageProvider::Firebase));
    }

    #[test]
    fn test_routing_fallbacks() {
        let manager = StorageManager::new(None, Some(MockService::arc(StorageProvider::Cloudinary)), None);
        assert_eq!(manager.select_provider("remix_audio", 1), Some(StorageProvider::Cloudinary));
        assert_eq!(manager.select_provider("template_thumbnail", 1), Some(StorageProvider::Cloudinary));

        let manager = StorageManager::new(Some(MockService::arc(StorageProvider::Backblaze)), None, None);
        assert_eq!(manager.select_provider("editor_image", 1), Some(StorageProvider::Backblaze));
        assert_eq!(manager.select_provider("effect_preview", 1), Some(StorageProvider::Backblaze));

        let manager = StorageManager::new(None, None, Some(MockService::arc(StorageProvider::Firebase)));
        assert_eq!(manager.select_provider("remix_video", 1), None);
    }

    #[test]
    fn test_auto_selection_by_size() {
        let manager = all_services();
        assert_eq!(
            manager.select_provider("other", LARGE_FILE_BYTES + 1),
            Some(StorageProvider::Cloudinary)
        );
        assert_eq!(manager.select_provider("other", 1024), Some(StorageProvider::Firebase));
        assert_eq!(
            manager.select_provider("other", 50 * 1024 * 1024),
            Some(StorageProvider::Cloudinary)
        );

        let manager = StorageManager::new(
            Some(MockService::arc(StorageProvider::Backblaze)),
            None,
            Some(MockService::arc(StorageProvider::Firebase)),
        );
        assert_eq!(
            manager.select_provider("other", LARGE_FILE_BYTES + 1),
            Some(StorageProvider::Backblaze)
        );
        assert_eq!(
            manager.select_provider("other", 50 * 1024 * 1024),
            Some(StorageProvider::Backblaze)
        );
    }

    #[tokio::test]
    async fn test_upload_without_services_fails() {
        let manager = StorageManager::default();
        assert!(!manager.has_any_service());
        let err = manager.upload_file(&upload("editor_video", 10)).await.unwrap_err();
        assert!(matches!(err, StorageError::NoServiceAvailable));
    }

    #[tokio::test]
    async fn test_upload_routes_to_selected_service() {
        let manager = all_services();
        let stored = manager.upload_file(&upload("remix_thumbnail", 10)).await.unwrap();
        assert_eq!(stored.service, StorageProvider::Backblaze);
        assert_eq!(stored.file_size, 10);
    }

    #[test]
    fn test_detect_provider() {
        assert_eq!(
            detect_provider("https://s3.us-west-004.backblazeb2.com/b/k"),
            Some(StorageProvider::Backblaze)
        );
        assert_eq!(
            detect_provider("https://f000.b2-api.com/file/b/k"),
            Some(StorageProvider::Backblaze)
        );
        assert_eq!(
            detect_provider("https://res.cloudinary.com/d/video/upload/a.mp4"),
            Some(StorageProvider::Cloudinary)
        );
        assert_eq!(
            detect_provider("https://firebasestorage.googleapis.com/v0/b/x/o/a"),
            Some(StorageProvider::Firebase)
        );
        assert_eq!(detect_provider("https://example.com/a.mp4"), None);
    }

    #[tokio::test]
    async fn test_delete_file_never_raises() {
        let backblaze = Arc::new(MockService {
            provider: StorageProvider::Backblaze,
            fail: true,
            deletes: AtomicUsize::new(0),
        });
        let cloudinary = Arc::new(MockService {
            provider: StorageProvider::Cloudinary,
            fail: false,
            deletes: AtomicUsize::new(0),
        });
        let manager = StorageManager::new(
            Some(backblaze.clone() as Arc<dyn StorageService>),
            Some(cloudinary.clone() as Arc<dyn StorageService>),
            None,
        );
        assert!(!manager.delete_file("https://example.com/a", None).await);
        assert!(!manager.delete_file("https://s3.x.backblazeb2.com/b/k", None).await);
        assert!(!manager.delete_file("https://firebasestorage.googleapis.com/v0/b/x/o/a", None).await);
        assert!(manager.delete_file("https://res.cloudinary.com/d/image/upload/a.png", None).await);
        assert!(
            manager
                .delete_file("https://example.com/a", Some(StorageProvider::Cloudinary))
                .await
        );

        // Unknown and unconfigured providers never reach a backend
        assert_eq!(backblaze.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(cloudinary.deletes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_download_url_falls_back_to_original() {
        let manager = StorageManager::new(
            Some(MockService::failing(StorageProvider::Backblaze)),
            Some(MockService::arc(StorageProvider::Cloudinary)),
            None,
        );
        let cloud = "https://res.cloudinary.com/d/image/upload/a.png";
        assert_eq!(manager.get_download_url(cloud, None).await, format!("{}?signed=1", cloud));

        let b2 = "https://s3.x.backblazeb2.com/b/k";
        assert_eq!(manager.get_download_url(b2, None).await, b2);
        assert_eq!(manager.get_download_url("https://example.com/x", None).await, "https://example.com/x");
    }

    #[test]
    fn test_status_and_info() {
        let manager = StorageManager::new(None, Some(MockService::arc(StorageProvider::Cloudinary)), None);
        assert_eq!(
            manager.get_service_status(),
            ServiceStatus {
                backblaze: false,
                cloudinary: true,
                firebase: false
            }
        );
        let info = manager.get_storage_info();
        assert_eq!(info.len(), 1);
        assert!(info.contains_key("cloudinary"));
    }
}

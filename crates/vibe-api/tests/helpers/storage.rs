use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use vibe_storage::{
    FileUpload, ServiceInfo, StorageManager, StorageProvider, StorageResult, StorageService,
    StoredFile,
};

/// In-memory stand-in for Cloudinary, keyed by the URL it hands out.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with this store registered as the only (Cloudinary) backend
    pub fn manager(&self) -> StorageManager {
        StorageManager::new(None, Some(Arc::new(self.clone())), None)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.objects.lock().unwrap().contains_key(url)
    }
}

#[async_trait]
impl StorageService for MemoryStorage {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Cloudinary
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::active("cloudinary", "unlimited", "integration tests")
    }

    async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile> {
        let url = format!(
            "https://res.cloudinary.com/test/raw/upload/{}/{}/{}",
            file.user_id,
            uuid::Uuid::new_v4(),
            file.filename
        );
        self.objects
            .lock()
            .unwrap()
            .insert(url.clone(), file.data.clone());

        Ok(StoredFile {
            success: true,
            file_id: None,
            public_id: None,
            file_name: file.filename.clone(),
            download_url: url,
            file_size: file.size(),
            content_type: file.content_type.clone(),
            service: StorageProvider::Cloudinary,
            metadata: serde_json::json!({}),
            thumbnail_url: None,
        })
    }

    async fn delete(&self, file_url: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().remove(file_url).is_some())
    }

    async fn signed_url(&self, file_url: &str, _expires_in: Duration) -> StorageResult<String> {
        Ok(format!("{}?signature=test", file_url))
    }
}

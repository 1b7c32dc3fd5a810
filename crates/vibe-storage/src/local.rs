use crate::traits::{StorageError, StorageResult};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Working directory on the local filesystem
///
/// Used for raw uploads awaiting processing, processed outputs and scratch files.
/// Keys are relative paths below `base_path`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create the directory (and parents) if missing
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path, rejecting keys that would escape
    /// the base directory.
    pub fn path_for(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(storage_key);
        let only_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if storage_key.is_empty() || !only_normal || storage_key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(relative))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write `data` under `storage_key` and return the absolute path
    pub async fn save(&self, storage_key: &str, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local file saved"
        );

        Ok(path)
    }

    pub async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.path_for(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Returns false when the file was already gone
    pub async fn remove(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.path_for(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_exists_remove() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads")).await.unwrap();

        let path = storage.save("abc_clip.mp4", b"data").await.unwrap();
        assert!(path.starts_with(storage.base_path()));
        assert!(storage.exists("abc_clip.mp4").await.unwrap());

        assert!(storage.remove("abc_clip.mp4").await.unwrap());
        assert!(!storage.remove("abc_clip.mp4").await.unwrap());
        assert!(!storage.exists("abc_clip.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_nested_keys_create_parents() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        let path = storage.save("a/b/c.txt", b"x").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(matches!(
            storage.path_for("../escape.txt"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.path_for("/etc/passwd").is_err());
        assert!(storage.path_for("./x").is_err());
        assert!(storage.path_for("").is_err());
    }
}

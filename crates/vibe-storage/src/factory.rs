use crate::{BackblazeStorage, CloudinaryStorage, FirebaseStorage, StorageManager, StorageResult, StorageService};
use std::sync::Arc;
use vibe_core::{Config, StorageProvider};

/// Build the storage manager from configuration
///
/// A backend without credentials is skipped with a warning. One whose client fails
/// to initialise is logged and skipped, so the server still starts with whatever
/// providers are usable.
pub fn create_storage_manager(config: &Config) -> StorageManager {
    let backblaze = init_backend(
        StorageProvider::Backblaze,
        config.backblaze().map(BackblazeStorage::new),
        "B2_APPLICATION_KEY_ID, B2_APPLICATION_KEY, B2_BUCKET_NAME",
    );
    let cloudinary = init_backend(
        StorageProvider::Cloudinary,
        config.cloudinary().map(CloudinaryStorage::new),
        "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET",
    );
    let firebase = init_backend(
        StorageProvider::Firebase,
        config.firebase().map(FirebaseStorage::new),
        "FIREBASE_CREDENTIALS_PATH",
    );

    StorageManager::new(backblaze, cloudinary, firebase)
}

fn init_backend<S>(
    provider: StorageProvider,
    built: Option<StorageResult<S>>,
    required_env: &str,
) -> Option<Arc<dyn StorageService>>
where
    S: StorageService + 'static,
{
    match built {
        None => {
            tracing::warn!(
                provider = %provider,
                required = required_env,
                "Storage credentials not configured, provider disabled"
            );
            None
        }
        Some(Err(e)) => {
            tracing::error!(error = %e, provider = %provider, "Failed to initialize storage provider");
            None
        }
        Some(Ok(service)) => Some(Arc::new(service)),
    }
}

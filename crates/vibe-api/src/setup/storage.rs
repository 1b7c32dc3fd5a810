//! Storage setup and initialization

use std::sync::Arc;
use vibe_core::Config;
use vibe_storage::{create_storage_manager, StorageManager};

/// Build the storage manager from whichever providers are configured.
/// Having none is allowed; uploads then answer 503.
pub fn setup_storage(config: &Config) -> Arc<StorageManager> {
    tracing::info!("Initializing storage services...");
    let manager = create_storage_manager(config);
    let status = manager.get_service_status();
    if manager.has_any_service() {
        tracing::info!(
            backblaze = status.backblaze,
            cloudinary = status.cloudinary,
            firebase = status.firebase,
            "Storage services initialized"
        );
    } else {
        tracing::warn!("No storage service configured, cloud uploads are disabled");
    }
    Arc::new(manager)
}

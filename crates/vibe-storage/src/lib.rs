//! Vibe Storage Library
//!
//! Multi-provider file storage for the editor. Three cloud backends implement
//! [`StorageService`]:
//!
//! - **Backblaze B2** (S3-compatible API) for AI Video Remix files
//! - **Cloudinary** for Vibe Video Editor media
//! - **Firebase Storage** for avatars and shared resources
//!
//! [`StorageManager`] routes uploads by file type (with fallbacks when a provider
//! is not configured) and maps stored URLs back to their provider for deletion
//! and signed download links. [`LocalStorage`] manages the on-disk working
//! directories used by the upload and processing pipeline.
//!
//! # Object key format
//!
//! - Backblaze: `{user_id}/{file_type}/{uuid}{.ext}`
//! - Cloudinary: public id `{user_id}/{file_type}/{uuid}` inside folder `video-editor/{user_id}`
//! - Firebase: `{file_type}/{user_id}/{uuid}{.ext}`

pub mod backblaze;
pub mod cloudinary;
pub mod factory;
pub mod firebase;
pub(crate) mod keys;
pub mod local;
pub mod manager;
pub mod traits;

// Re-export commonly used types
pub use backblaze::BackblazeStorage;
pub use cloudinary::CloudinaryStorage;
pub use factory::create_storage_manager;
pub use firebase::FirebaseStorage;
pub use local::LocalStorage;
pub use manager::{detect_provider, ServiceStatus, StorageManager};
pub use traits::{FileUpload, ServiceInfo, StorageError, StorageResult, StorageService, StoredFile};
pub use vibe_core::StorageProvider;

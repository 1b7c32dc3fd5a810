//! Vibe Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all Vibe components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, EditorConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageProvider;

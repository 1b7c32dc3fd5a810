//! Vibe Database Layer
//!
//! This crate provides the Postgres repositories behind the editor API.
//
// Module declarations
pub mod db;

// Re-exports: Account repositories (users, plans, branding)
pub use db::{SubscriptionRepository, UserRepository, WhiteLabelRepository};

// Re-exports: Editor repositories (projects, assets, uploads and jobs)
pub use db::{AssetRepository, ProjectRepository, UploadRepository};

// Re-exports: Transaction utilities
pub use db::transaction::TransactionGuard;

//! Database repositories for data access layer
//!
//! Repositories are organized into account/ (users, subscriptions, white-label
//! branding) and editor/ (projects, assets, uploads and processing jobs). Every
//! user-owned query is scoped by `user_id`, so a row owned by someone else reads
//! exactly like a missing one.
//
// Account repositories
pub mod account;
//
// Editor repositories
pub mod editor;
//
// Transaction utilities
pub mod transaction;

pub use account::{SubscriptionRepository, UserRepository, WhiteLabelRepository};
pub use editor::{AssetRepository, ProjectRepository, UploadRepository};

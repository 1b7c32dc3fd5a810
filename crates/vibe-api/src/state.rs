//! Application state and sub-states.
//!
//! Handlers take `State<Arc<AppState>>` and reach into the sub-state they need.

use std::sync::Arc;

use sqlx::PgPool;
use vibe_core::Config;
use vibe_db::{
    AssetRepository, ProjectRepository, SubscriptionRepository, UploadRepository, UserRepository,
    WhiteLabelRepository,
};
use vibe_processing::VideoProcessor;
use vibe_storage::{LocalStorage, StorageManager};

use crate::auth::middleware::AuthFailureLimiter;
use crate::auth::JwtService;
use crate::job_queue::VideoJobQueue;
use crate::middleware::WhiteLabelCache;

/// Database pool and repositories
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub subscriptions: SubscriptionRepository,
    pub white_labels: WhiteLabelRepository,
    pub projects: ProjectRepository,
    pub assets: AssetRepository,
    pub uploads: UploadRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            subscriptions: SubscriptionRepository::new(pool.clone()),
            white_labels: WhiteLabelRepository::new(pool.clone()),
            projects: ProjectRepository::new(pool.clone()),
            assets: AssetRepository::new(pool.clone()),
            uploads: UploadRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Cloud storage routing, local working directories and the video pipeline
#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<StorageManager>,
    /// `uploads/`: raw video uploads
    pub uploads: LocalStorage,
    pub processor: VideoProcessor,
    pub max_upload_size_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaState,
    pub jwt: JwtService,
    /// Shared by the bearer-token middleware and the login handler
    pub auth_failures: Arc<AuthFailureLimiter>,
    pub white_label_cache: Arc<WhiteLabelCache>,
    pub jobs: VideoJobQueue,
    pub config: Config,
}

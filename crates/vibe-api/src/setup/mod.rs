//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::auth::middleware::AuthFailureLimiter;
use crate::auth::JwtService;
use crate::job_queue::VideoJobQueue;
use crate::middleware::WhiteLabelCache;
use crate::state::{AppState, DbState, MediaState};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use vibe_core::constants::{
    AUTH_FAILURE_LIMIT, AUTH_FAILURE_WINDOW_SECS, WHITE_LABEL_CACHE_CAPACITY,
    WHITE_LABEL_CACHE_TTL_SECS,
};
use vibe_core::Config;
use vibe_processing::{JobRunner, VideoProcessor};
use vibe_storage::{LocalStorage, StorageManager};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config);

    let state = build_state(config.clone(), pool, storage).await?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Wire repositories, working directories, the video pipeline and the job queue
pub async fn build_state(
    config: Config,
    pool: PgPool,
    storage: Arc<StorageManager>,
) -> Result<Arc<AppState>> {
    let db = DbState::new(pool);

    let uploads = LocalStorage::new(config.upload_dir())
        .await
        .context("Failed to prepare upload directory")?;
    let processed = LocalStorage::new(config.processed_dir())
        .await
        .context("Failed to prepare processed directory")?;
    tokio::fs::create_dir_all(config.temp_dir())
        .await
        .context("Failed to prepare temp directory")?;

    let processor = VideoProcessor::new(
        config.ffmpeg_path(),
        config.ffprobe_path(),
        config.temp_dir(),
    );
    let runner = JobRunner::new(processor.clone(), db.uploads.clone(), processed);
    let jobs = VideoJobQueue::new(
        runner,
        config.max_concurrent_jobs(),
        config.video_job_queue_size(),
    );

    let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());
    let auth_failures = Arc::new(AuthFailureLimiter::new(
        AUTH_FAILURE_LIMIT,
        AUTH_FAILURE_WINDOW_SECS,
    ));
    let white_label_cache = Arc::new(WhiteLabelCache::new(
        Duration::from_secs(WHITE_LABEL_CACHE_TTL_SECS),
        WHITE_LABEL_CACHE_CAPACITY,
    ));

    let media = MediaState {
        storage,
        uploads,
        processor,
        max_upload_size_bytes: config.max_upload_size_bytes(),
    };

    Ok(Arc::new(AppState {
        db,
        media,
        jwt,
        auth_failures,
        white_label_cache,
        jobs,
        config,
    }))
}

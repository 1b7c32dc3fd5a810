//! Database setup and initialization

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use vibe_core::Config;
use vibe_db::SubscriptionRepository;

/// Setup database connection pool, run migrations and seed the default plans
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    // Embedded at compile time from the workspace migrations/ directory
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let seeded = SubscriptionRepository::new(pool.clone())
        .seed_default_plans()
        .await
        .context("Failed to seed subscription plans")?;
    if seeded > 0 {
        tracing::info!(plans = seeded, "Default subscription plans seeded");
    }

    Ok(pool)
}

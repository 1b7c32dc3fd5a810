use sqlx::{PgPool, Postgres};
use vibe_core::{
    models::{Asset, AssetChanges, NewAsset},
    AppError,
};

const ASSET_COLUMNS: &str = "id, user_id, project_id, asset_name, asset_type, storage_provider, file_path, file_size, asset_metadata, storage_managed, created_at";

/// Repository for stored assets
#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an asset. A `project_id` must belong to the same user.
    #[tracing::instrument(skip(self, asset), fields(db.table = "assets", db.operation = "insert", user_id = asset.user_id))]
    pub async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, AppError> {
        if let Some(project_id) = asset.project_id {
            let project_exists = sqlx::query_scalar::<Postgres, bool>(
                "SELECT EXISTS(SELECT 1 FROM projects WHERE id = $1 AND user_id = $2)",
            )
            .bind(project_id)
            .bind(asset.user_id)
            .fetch_one(&self.pool)
            .await?;

            if !project_exists {
                return Err(AppError::NotFound("Project not found".to_string()));
            }
        }

        let created = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            INSERT INTO assets (
                user_id, project_id, asset_name, asset_type, storage_provider,
                file_path, file_size, asset_metadata, storage_managed
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(asset.user_id)
        .bind(asset.project_id)
        .bind(&asset.asset_name)
        .bind(asset.asset_type)
        .bind(asset.storage_provider)
        .bind(&asset.file_path)
        .bind(asset.file_size)
        .bind(&asset.asset_metadata)
        .bind(asset.storage_managed)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    pub async fn list_assets(&self, user_id: i64) -> Result<Vec<Asset>, AppError> {
        let assets = sqlx::query_as::<Postgres, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    /// Get asset by ID (user-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select", db.record_id = %id))]
    pub async fn get_asset(&self, user_id: i64, id: i64) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    /// Partial update. Pointing the row at a different file or provider drops
    /// `storage_managed`, so the new path is never deleted or signed remotely.
    #[tracing::instrument(skip(self, changes), fields(db.table = "assets", db.operation = "update", db.record_id = %id))]
    pub async fn update_asset(
        &self,
        user_id: i64,
        id: i64,
        changes: &AssetChanges,
    ) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            r#"
            UPDATE assets SET
                asset_name = COALESCE($3, asset_name),
                asset_type = COALESCE($4, asset_type),
                storage_provider = COALESCE($5, storage_provider),
                file_path = COALESCE($6, file_path),
                asset_metadata = COALESCE($7, asset_metadata),
                storage_managed = storage_managed
                    AND ($5 IS NULL OR $5 = storage_provider)
                    AND ($6 IS NULL OR $6 = file_path)
            WHERE user_id = $1 AND id = $2
            RETURNING {ASSET_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(id)
        .bind(&changes.asset_name)
        .bind(changes.asset_type)
        .bind(changes.storage_provider)
        .bind(&changes.file_path)
        .bind(&changes.asset_metadata)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    /// Delete and return the row so the caller can clean up the stored file
    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_asset(&self, user_id: i64, id: i64) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<Postgres, Asset>(&format!(
            "DELETE FROM assets WHERE user_id = $1 AND id = $2 RETURNING {ASSET_COLUMNS}"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }
}

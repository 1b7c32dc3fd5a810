use sqlx::{PgPool, Postgres};
use vibe_core::{
    models::{CreateWhiteLabelRequest, UpdateWhiteLabelRequest, WhiteLabelConfig},
    AppError,
};

const CONFIG_COLUMNS: &str = "id, user_id, custom_domain, domain_verified, logo_url, favicon_url, primary_color, secondary_color, contact_email, created_at";

/// Repository for white-label (custom domain) configurations
#[derive(Clone)]
pub struct WhiteLabelRepository {
    pool: PgPool,
}

fn domain_conflict(err: sqlx::Error) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => {
            AppError::Conflict("Custom domain is already in use".to_string())
        }
        other => other,
    }
}

impl WhiteLabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the user's configuration. A user has at most one.
    #[tracing::instrument(skip(self, request), fields(db.table = "white_label_configs", db.operation = "insert"))]
    pub async fn create_config(
        &self,
        user_id: i64,
        custom_domain: &str,
        request: &CreateWhiteLabelRequest,
    ) -> Result<WhiteLabelConfig, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM white_label_configs WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if exists {
            return Err(AppError::Conflict(
                "White label config already exists for this user".to_string(),
            ));
        }

        let config = sqlx::query_as::<Postgres, WhiteLabelConfig>(&format!(
            r#"
            INSERT INTO white_label_configs (
                user_id, custom_domain, logo_url, favicon_url,
                primary_color, secondary_color, contact_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(custom_domain)
        .bind(&request.logo_url)
        .bind(&request.favicon_url)
        .bind(&request.primary_color)
        .bind(&request.secondary_color)
        .bind(&request.contact_email)
        .fetch_one(&self.pool)
        .await
        .map_err(domain_conflict)?;

        Ok(config)
    }

    #[tracing::instrument(skip(self), fields(db.table = "white_label_configs", db.operation = "select"))]
    pub async fn get_for_user(&self, user_id: i64) -> Result<Option<WhiteLabelConfig>, AppError> {
        let config = sqlx::query_as::<Postgres, WhiteLabelConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM white_label_configs WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Look up a verified configuration by the request host
    #[tracing::instrument(skip(self), fields(db.table = "white_label_configs", db.operation = "select"))]
    pub async fn find_verified_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<WhiteLabelConfig>, AppError> {
        let config = sqlx::query_as::<Postgres, WhiteLabelConfig>(&format!(
            "SELECT {CONFIG_COLUMNS} FROM white_label_configs WHERE custom_domain = $1 AND domain_verified = TRUE"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(config)
    }

    /// Partial update; `None` fields keep their current value
    #[tracing::instrument(skip(self, request), fields(db.table = "white_label_configs", db.operation = "update"))]
    pub async fn update_config(
        &self,
        user_id: i64,
        request: &UpdateWhiteLabelRequest,
    ) -> Result<Option<WhiteLabelConfig>, AppError> {
        let config = sqlx::query_as::<Postgres, WhiteLabelConfig>(&format!(
            r#"
            UPDATE white_label_configs SET
                custom_domain = COALESCE($2, custom_domain),
                logo_url = COALESCE($3, logo_url),
                favicon_url = COALESCE($4, favicon_url),
                primary_color = COALESCE($5, primary_color),
                secondary_color = COALESCE($6, secondary_color),
                contact_email = COALESCE($7, contact_email),
                domain_verified = COALESCE($8, domain_verified)
            WHERE user_id = $1
            RETURNING {CONFIG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.custom_domain)
        .bind(&request.logo_url)
        .bind(&request.favicon_url)
        .bind(&request.primary_color)
        .bind(&request.secondary_color)
        .bind(&request.contact_email)
        .bind(request.domain_verified)
        .fetch_optional(&self.pool)
        .await
        .map_err(domain_conflict)?;

        Ok(config)
    }

    /// Returns whether a configuration was deleted
    #[tracing::instrument(skip(self), fields(db.table = "white_label_configs", db.operation = "delete"))]
    pub async fn delete_config(&self, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM white_label_configs WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

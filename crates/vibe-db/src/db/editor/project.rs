use sqlx::{PgPool, Postgres};
use vibe_core::{
    models::{Project, ProjectType},
    AppError,
};

const PROJECT_COLUMNS: &str = "id, user_id, project_name, project_type, project_data, storage_provider, file_path, created_at";

/// Repository for editor projects
#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a project with an empty editor document
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "insert"))]
    pub async fn create_project(
        &self,
        user_id: i64,
        project_name: &str,
        project_type: ProjectType,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, project_name, project_type, project_data)
            VALUES ($1, $2, $3, '{{}}'::jsonb)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(project_name)
        .bind(project_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(project)
    }

    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select"))]
    pub async fn list_projects(&self, user_id: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    /// Get project by ID (user-scoped)
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "select", db.record_id = %id))]
    pub async fn get_project(&self, user_id: i64, id: i64) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    /// Partial update; `None` fields keep their current value.
    /// `project_data` replaces the whole document when given.
    #[tracing::instrument(skip(self, project_data), fields(db.table = "projects", db.operation = "update", db.record_id = %id))]
    pub async fn update_project(
        &self,
        user_id: i64,
        id: i64,
        project_name: Option<&str>,
        project_type: Option<ProjectType>,
        project_data: Option<&serde_json::Value>,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            UPDATE projects SET
                project_name = COALESCE($3, project_name),
                project_type = COALESCE($4, project_type),
                project_data = COALESCE($5, project_data)
            WHERE user_id = $1 AND id = $2
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(id)
        .bind(project_name)
        .bind(project_type)
        .bind(project_data)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    /// Shallow-merge keys into `project_data`, keeping keys not mentioned in `patch`
    #[tracing::instrument(skip(self, patch), fields(db.table = "projects", db.operation = "update", db.record_id = %id))]
    pub async fn merge_project_data(
        &self,
        user_id: i64,
        id: i64,
        patch: &serde_json::Value,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<Postgres, Project>(&format!(
            r#"
            UPDATE projects SET project_data = COALESCE(project_data, '{{}}'::jsonb) || $3
            WHERE user_id = $1 AND id = $2
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(id)
        .bind(patch)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }

    /// Returns whether a project was deleted
    #[tracing::instrument(skip(self), fields(db.table = "projects", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_project(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

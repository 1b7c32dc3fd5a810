use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vibe_core::{
    models::{JobStatus, NewUpload, ProcessingJob, Upload, UploadStatus},
    AppError,
};

const UPLOAD_COLUMNS: &str = "id, user_id, original_filename, stored_filename, file_path, file_size, content_type, video_info, status, created_at";
const JOB_COLUMNS: &str = "id, upload_id, user_id, status, progress, options, output_path, error_message, created_at, updated_at";

/// Repository for local video uploads and their processing jobs
#[derive(Clone)]
pub struct UploadRepository {
    pool: PgPool,
}

impl UploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, upload), fields(db.table = "uploads", db.operation = "insert", db.record_id = %upload.id))]
    pub async fn create_upload(&self, upload: &NewUpload) -> Result<Upload, AppError> {
        let created = sqlx::query_as::<Postgres, Upload>(&format!(
            r#"
            INSERT INTO uploads (
                id, user_id, original_filename, stored_filename, file_path,
                file_size, content_type, video_info, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {UPLOAD_COLUMNS}
            "#
        ))
        .bind(upload.id)
        .bind(upload.user_id)
        .bind(&upload.original_filename)
        .bind(&upload.stored_filename)
        .bind(&upload.file_path)
        .bind(upload.file_size)
        .bind(&upload.content_type)
        .bind(&upload.video_info)
        .bind(UploadStatus::Uploaded)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = %id))]
    pub async fn get_upload(&self, user_id: i64, id: Uuid) -> Result<Option<Upload>, AppError> {
        let upload = sqlx::query_as::<Postgres, Upload>(&format!(
            "SELECT {UPLOAD_COLUMNS} FROM uploads WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(upload)
    }

    /// Create a queued job for an upload
    #[tracing::instrument(skip(self, options), fields(db.table = "processing_jobs", db.operation = "insert"))]
    pub async fn create_job(
        &self,
        user_id: i64,
        upload_id: Uuid,
        options: &serde_json::Value,
    ) -> Result<ProcessingJob, AppError> {
        let job = sqlx::query_as::<Postgres, ProcessingJob>(&format!(
            r#"
            INSERT INTO processing_jobs (id, upload_id, user_id, status, progress, options)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(upload_id)
        .bind(user_id)
        .bind(JobStatus::Queued)
        .bind(options)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    #[tracing::instrument(skip(self), fields(db.table = "processing_jobs", db.operation = "select", db.record_id = %id))]
    pub async fn get_job(&self, user_id: i64, id: Uuid) -> Result<Option<ProcessingJob>, AppError> {
        let job = sqlx::query_as::<Postgres, ProcessingJob>(&format!(
            "SELECT {JOB_COLUMNS} FROM processing_jobs WHERE user_id = $1 AND id = $2"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    #[tracing::instrument(skip(self), fields(db.table = "processing_jobs", db.operation = "update", db.record_id = %id))]
    pub async fn mark_job_processing(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE processing_jobs SET status = $2, progress = 0, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Processing)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record progress (clamped to 0-100) for a running job
    #[tracing::instrument(skip(self), fields(db.table = "processing_jobs", db.operation = "update", db.record_id = %id))]
    pub async fn update_job_progress(&self, id: Uuid, progress: i32) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE processing_jobs SET progress = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(progress.clamp(0, 100))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "processing_jobs", db.operation = "update", db.record_id = %id))]
    pub async fn complete_job(&self, id: Uuid, output_path: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE processing_jobs
            SET status = $2, progress = 100, output_path = $3, error_message = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Completed)
        .bind(output_path)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "processing_jobs", db.operation = "update", db.record_id = %id))]
    pub async fn fail_job(&self, id: Uuid, message: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE processing_jobs SET status = $2, error_message = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(JobStatus::Failed)
        .bind(message)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

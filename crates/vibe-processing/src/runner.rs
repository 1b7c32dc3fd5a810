//! Background processing pipeline for uploaded videos

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

use vibe_core::models::ProcessingJob;
use vibe_db::UploadRepository;
use vibe_storage::LocalStorage;

use crate::args::TextPosition;
use crate::options::ProcessingOptions;
use crate::processor::VideoProcessor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Trim,
    TextOverlay,
    Convert,
    ExtractAudio,
    Thumbnail,
}

/// Steps in execution order. Conversion always runs.
fn plan_steps(options: &ProcessingOptions) -> Vec<Step> {
    let mut steps = Vec::with_capacity(5);
    if options.trim.is_some() {
        steps.push(Step::Trim);
    }
    if options.text_overlay.is_some() {
        steps.push(Step::TextOverlay);
    }
    steps.push(Step::Convert);
    if options.extract_audio {
        steps.push(Step::ExtractAudio);
    }
    if options.thumbnail {
        steps.push(Step::Thumbnail);
    }
    steps
}

/// Progress reported after `done` of `total` steps. 100 is reserved for completion.
fn step_progress(done: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((done * 90) / total) as i32
}

/// Executes queued jobs and records their outcome
#[derive(Clone)]
pub struct JobRunner {
    processor: VideoProcessor,
    uploads: UploadRepository,
    processed: LocalStorage,
}

impl JobRunner {
    /// `processor` must point at the temp root; each job gets its own directory in it
    pub fn new(processor: VideoProcessor, uploads: UploadRepository, processed: LocalStorage) -> Self {
        Self {
            processor,
            uploads,
            processed,
        }
    }

    /// Run a job to completion. Failures are stored on the job, never returned.
    #[tracing::instrument(skip(self, job), fields(job_id = %job.id, upload_id = %job.upload_id, user_id = job.user_id))]
    pub async fn run(&self, job: ProcessingJob) {
        if let Err(e) = self.uploads.mark_job_processing(job.id).await {
            tracing::error!(error = %e, "Failed to mark job as processing");
        }

        let start = std::time::Instant::now();
        match self.execute(&job).await {
            Ok(output_path) => {
                tracing::info!(
                    output_path = %output_path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Processing job completed"
                );
                if let Err(e) = self.uploads.complete_job(job.id, &output_path).await {
                    tracing::error!(error = %e, "Failed to record job completion");
                }
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::warn!(
                    error = %message,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Processing job failed"
                );
                if let Err(e) = self.uploads.fail_job(job.id, &message).await {
                    tracing::error!(error = %e, "Failed to record job failure");
                }
            }
        }
    }

    async fn execute(&self, job: &ProcessingJob) -> Result<String> {
        let options = ProcessingOptions::from_value(Some(&job.options))?;
        options.validate()?;

        let upload = self
            .uploads
            .get_upload(job.user_id, job.upload_id)
            .await?
            .context("Upload not found")?;

        tokio::fs::create_dir_all(self.processor.temp_dir())
            .await
            .context("Failed to create temp directory")?;
        let job_dir = TempDir::new_in(self.processor.temp_dir())
            .context("Failed to create job directory")?;
        let processor = self.processor.with_temp_dir(job_dir.path());

        let steps = plan_steps(&options);
        let total = steps.len();
        let mut current = PathBuf::from(&upload.file_path);
        let mut video_output = None;

        for (index, step) in steps.into_iter().enumerate() {
            tracing::debug!(step = ?step, "Running processing step");
            match step {
                Step::Trim => {
                    if let Some(trim) = &options.trim {
                        current = processor
                            .trim_video(&current, trim.start, trim.duration)
                            .await?;
                    }
                }
                Step::TextOverlay => {
                    if let Some(overlay) = &options.text_overlay {
                        let position = overlay
                            .position
                            .as_deref()
                            .map(TextPosition::parse)
                            .unwrap_or_default();
                        current = processor
                            .add_text_overlay(&current, &overlay.text, position, overlay.duration)
                            .await?;
                    }
                }
                Step::Convert => {
                    let format = options.output_format();
                    let converted = processor
                        .convert_video(
                            &current,
                            format,
                            options.width,
                            options.height,
                            options.bitrate.as_deref(),
                        )
                        .await?;
                    let destination = self
                        .store_output(&converted, &output_key(job.id, format))
                        .await?;
                    current = destination.clone();
                    video_output = Some(destination);
                }
                Step::ExtractAudio => {
                    let format = options.audio_output_format();
                    let audio = processor.extract_audio(&current, format).await?;
                    self.store_output(&audio, &format!("{}_audio.{}", job.id, format))
                        .await?;
                }
                Step::Thumbnail => {
                    let thumb = processor.generate_thumbnail(&current, 0.0, 300, 200).await?;
                    self.store_output(&thumb, &format!("{}_thumb.jpg", job.id))
                        .await?;
                }
            }

            if let Err(e) = self
                .uploads
                .update_job_progress(job.id, step_progress(index + 1, total))
                .await
            {
                tracing::warn!(error = %e, "Failed to update job progress");
            }
        }

        let output = video_output.context("Conversion produced no output")?;
        Ok(output.to_string_lossy().into_owned())
    }

    /// Move a finished artifact into the processed directory
    async fn store_output(&self, source: &Path, key: &str) -> Result<PathBuf> {
        let destination = self.processed.path_for(key)?;
        move_file(source, &destination).await?;
        Ok(destination)
    }
}

async fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    if tokio::fs::rename(source, destination).await.is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    tokio::fs::copy(source, destination)
        .await
        .with_context(|| format!("Failed to copy output to {}", destination.display()))?;
    tokio::fs::remove_file(source).await.ok();
    Ok(())
}

/// Processed output key for a job
pub fn output_key(job_id: Uuid, format: &str) -> String {
    format!("{}.{}", job_id, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{TextOverlayOptions, TrimOptions};

    #[test]
    fn test_plan_steps_default_only_converts() {
        assert_eq!(plan_steps(&ProcessingOptions::default()), vec![Step::Convert]);
    }

    #[test]
    fn test_plan_steps_order() {
        let options = ProcessingOptions {
            trim: Some(TrimOptions {
                start: 0.0,
                duration: 3.0,
            }),
            text_overlay: Some(TextOverlayOptions {
                text: "hi".to_string(),
                position: None,
                duration: None,
            }),
            extract_audio: true,
            thumbnail: true,
            ..Default::default()
        };
        assert_eq!(
            plan_steps(&options),
            vec![
                Step::Trim,
                Step::TextOverlay,
                Step::Convert,
                Step::ExtractAudio,
                Step::Thumbnail
            ]
        );
    }

    #[test]
    fn test_step_progress() {
        assert_eq!(step_progress(1, 1), 90);
        assert_eq!(step_progress(1, 3), 30);
        assert_eq!(step_progress(0, 0), 0);
    }

    #[test]
    fn test_output_key() {
        let id = Uuid::nil();
        assert_eq!(output_key(id, "mp4"), format!("{}.mp4", id));
    }

    #[tokio::test]
    async fn test_move_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        tokio::fs::write(&source, b"x").await.unwrap();
        let destination = dir.path().join("nested/b.txt");

        move_file(&source, &destination).await.unwrap();

        assert!(!source.exists());
        assert_eq!(tokio::fs::read(&destination).await.unwrap(), b"x");
    }
}

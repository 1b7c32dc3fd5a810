use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Semaphore};
use vibe_core::models::ProcessingJob;
use vibe_processing::JobRunner;

/// Bounded queue feeding a worker pool of at most `max_concurrent` ffmpeg jobs
#[derive(Clone)]
pub struct VideoJobQueue {
    tx: mpsc::Sender<ProcessingJob>,
}

impl VideoJobQueue {
    /// At most `queue_size` jobs wait for a worker. When the queue is full,
    /// `submit()` returns an error.
    pub fn new(runner: JobRunner, max_concurrent: usize, queue_size: usize) -> Self {
        let queue_size = queue_size.max(1);
        let max_concurrent = max_concurrent.max(1);

        let (tx, rx) = mpsc::channel(queue_size);

        tokio::spawn(async move {
            Self::worker_pool(rx, runner, max_concurrent).await;
        });

        tracing::info!(
            queue_size = queue_size,
            max_concurrent = max_concurrent,
            "Video job queue initialized"
        );

        Self { tx }
    }

    #[tracing::instrument(skip(self, job), fields(job_id = %job.id, upload_id = %job.upload_id))]
    pub fn submit(&self, job: ProcessingJob) -> Result<()> {
        tracing::info!("Enqueuing video processing job");
        self.tx.try_send(job).map_err(|e| match &e {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!("Video job queue is full, rejecting job");
                anyhow::anyhow!("Video job queue is full, please try again later")
            }
            mpsc::error::TrySendError::Closed(_) => {
                anyhow::anyhow!("Video job queue is not running")
            }
        })
    }

    async fn worker_pool(
        mut rx: mpsc::Receiver<ProcessingJob>,
        runner: JobRunner,
        max_concurrent: usize,
    ) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = rx.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let runner = runner.clone();

            tokio::spawn(async move {
                let _permit = permit;
                runner.run(job).await;
            });
        }

        tracing::info!("Video job queue stopped");
    }
}

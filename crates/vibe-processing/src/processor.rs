//! FFmpeg/ffprobe runner

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use uuid::Uuid;

use crate::args::{self, TextPosition};
use crate::formats::{supported_formats, SupportedFormats};
use crate::probe::{parse_probe_output, VideoInfo};

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(30);
const SHORT_OP_TIMEOUT: Duration = Duration::from_secs(120);
const LONG_OP_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters never allowed in a path handed to ffmpeg
const FORBIDDEN_PATH_CHARS: &[char] = &[';', '|', '&', '$', '`', '<', '>', '\n', '\r', '\0'];

/// Keep the tail of stderr in error messages
const STDERR_TAIL_CHARS: usize = 500;

/// Runs ffmpeg operations, writing outputs to `temp_dir`
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    ffmpeg_path: String,
    ffprobe_path: String,
    temp_dir: PathBuf,
}

impl VideoProcessor {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
        temp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// Same binaries, different output directory
    pub fn with_temp_dir(&self, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: self.ffmpeg_path.clone(),
            ffprobe_path: self.ffprobe_path.clone(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn output_path(&self, operation: &str, ext: &str) -> PathBuf {
        self.temp_dir
            .join(format!("{}_{}.{}", operation, Uuid::new_v4(), ext))
    }

    /// Whether ffmpeg can be executed
    pub async fn check_ffmpeg(&self) -> bool {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(VERSION_TIMEOUT, cmd.status()).await {
            Ok(Ok(status)) if status.success() => true,
            Ok(Ok(status)) => {
                tracing::error!(status = %status, "FFmpeg not working properly");
                false
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, ffmpeg_path = %self.ffmpeg_path, "FFmpeg not available");
                false
            }
            Err(_) => {
                tracing::error!(ffmpeg_path = %self.ffmpeg_path, "FFmpeg version check timed out");
                false
            }
        }
    }

    async fn run_ffmpeg(&self, operation: &str, args: Vec<String>, limit: Duration) -> Result<()> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(limit, cmd.output())
            .await
            .map_err(|_| anyhow!("{} timed out after {}s", operation, limit.as_secs()))?
            .with_context(|| format!("Failed to run ffmpeg for {}", operation))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr
                .chars()
                .rev()
                .take(STDERR_TAIL_CHARS)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            tracing::warn!(
                operation = operation,
                status = %output.status,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "ffmpeg failed"
            );
            bail!("{} failed: {}", operation, tail.trim());
        }

        tracing::debug!(
            operation = operation,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffmpeg finished"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(path = %path.display()))]
    pub async fn get_video_info(&self, path: &Path) -> Result<VideoInfo> {
        validate_path(path)?;

        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(PROBE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| anyhow!("Video analysis timed out"))?
            .context("Failed to run ffprobe")?;

        if !output.status.success() {
            bail!(
                "Video analysis failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
            .context("Video analysis failed")
    }

    pub async fn generate_thumbnail(
        &self,
        path: &Path,
        time_offset: f64,
        width: u32,
        height: u32,
    ) -> Result<PathBuf> {
        validate_path(path)?;
        let output = self.output_path("thumb", "jpg");
        self.run_ffmpeg(
            "Thumbnail generation",
            args::thumbnail_args(path, &output, time_offset, width, height),
            THUMBNAIL_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    pub async fn convert_video(
        &self,
        path: &Path,
        format: &str,
        width: Option<u32>,
        height: Option<u32>,
        bitrate: Option<&str>,
    ) -> Result<PathBuf> {
        validate_path(path)?;
        let output = self.output_path("converted", format);
        self.run_ffmpeg(
            "Video conversion",
            args::convert_args(path, &output, format, width, height, bitrate),
            LONG_OP_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    pub async fn extract_audio(&self, path: &Path, format: &str) -> Result<PathBuf> {
        validate_path(path)?;
        let output = self.output_path("audio", format);
        self.run_ffmpeg(
            "Audio extraction",
            args::extract_audio_args(path, &output, format),
            SHORT_OP_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    pub async fn merge_audio_video(&self, video: &Path, audio: &Path) -> Result<PathBuf> {
        validate_path(video)?;
        validate_path(audio)?;
        let output = self.output_path("merged", "mp4");
        self.run_ffmpeg(
            "Audio/video merge",
            args::merge_args(video, audio, &output),
            LONG_OP_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    pub async fn trim_video(&self, path: &Path, start: f64, duration: f64) -> Result<PathBuf> {
        validate_path(path)?;
        let output = self.output_path("trimmed", "mp4");
        self.run_ffmpeg(
            "Video trimming",
            args::trim_args(path, &output, start, duration),
            SHORT_OP_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    pub async fn add_text_overlay(
        &self,
        path: &Path,
        text: &str,
        position: TextPosition,
        duration: Option<f64>,
    ) -> Result<PathBuf> {
        validate_path(path)?;
        let output = self.output_path("text_overlay", "mp4");
        self.run_ffmpeg(
            "Text overlay",
            args::text_overlay_args(path, &output, text, position, duration),
            LONG_OP_TIMEOUT,
        )
        .await?;
        Ok(output)
    }

    /// Best-effort removal
    pub async fn cleanup_temp_file(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Cleaned up temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to cleanup temp file")
            }
        }
    }

    pub fn get_supported_formats(&self) -> SupportedFormats {
        supported_formats()
    }
}

/// Reject paths with shell metacharacters or parent-directory components
pub fn validate_path(path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        bail!("Empty media path");
    }
    if text.contains(FORBIDDEN_PATH_CHARS) {
        bail!("Media path contains invalid characters");
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        bail!("Media path must not contain '..'");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path(Path::new("uploads/abc.mp4")).is_ok());
        assert!(validate_path(Path::new("/data/processed_videos/x.webm")).is_ok());
        assert!(validate_path(Path::new("uploads/../etc/passwd")).is_err());
        assert!(validate_path(Path::new("a.mp4; rm -rf /")).is_err());
        assert!(validate_path(Path::new("$(whoami).mp4")).is_err());
        assert!(validate_path(Path::new("")).is_err());
    }

    #[test]
    fn test_output_paths_live_in_temp_dir() {
        let processor = VideoProcessor::new("ffmpeg", "ffprobe", "temp_processing");
        let path = processor.output_path("converted", "webm");
        assert!(path.starts_with("temp_processing"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("converted_"));
        assert!(name.ends_with(".webm"));

        let scoped = processor.with_temp_dir("/tmp/job");
        assert_eq!(scoped.temp_dir(), Path::new("/tmp/job"));
    }

    #[tokio::test]
    async fn test_check_ffmpeg_missing_binary() {
        let processor = VideoProcessor::new("/nonexistent/ffmpeg-binary", "ffprobe", "tmp");
        assert!(!processor.check_ffmpeg().await);
    }

    #[tokio::test]
    async fn test_cleanup_missing_file_is_silent() {
        let processor = VideoProcessor::new("ffmpeg", "ffprobe", "tmp");
        processor
            .cleanup_temp_file(Path::new("/nonexistent/file.mp4"))
            .await;
    }

    #[tokio::test]
    async fn test_operations_reject_unsafe_paths() {
        let processor = VideoProcessor::new("ffmpeg", "ffprobe", "tmp");
        let err = processor
            .trim_video(Path::new("../x.mp4"), 0.0, 1.0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains(".."));
    }
}

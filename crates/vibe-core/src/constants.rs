//! Application-wide constants

pub const APP_NAME: &str = "Vibe Video Editor API";
pub const APP_VERSION: &str = "1.0.0";

/// Extensions accepted by `/api/upload/video`
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"];

/// Default lifetime of signed download URLs
pub const DOWNLOAD_URL_EXPIRY_SECS: u64 = 24 * 60 * 60;

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn is_allowed_video_extension(ext: &str) -> bool {
    ALLOWED_VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Failed authentication attempts allowed per client IP within the window
pub const AUTH_FAILURE_LIMIT: u32 = 10;
pub const AUTH_FAILURE_WINDOW_SECS: u64 = 15 * 60;

/// How long a custom-domain lookup (hit or miss) is reused
pub const WHITE_LABEL_CACHE_TTL_SECS: u64 = 60;
pub const WHITE_LABEL_CACHE_CAPACITY: usize = 1024;

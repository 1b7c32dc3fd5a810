//! Vibe Processing Library
//!
//! FFmpeg-based video operations and the background job pipeline that applies
//! them to uploaded videos.

pub mod args;
pub mod formats;
pub mod options;
pub mod probe;
pub mod processor;
pub mod runner;

pub use formats::{supported_formats, SupportedFormats};
pub use options::{ProcessingOptions, TextOverlayOptions, TrimOptions};
pub use probe::VideoInfo;
pub use processor::VideoProcessor;
pub use runner::JobRunner;

//! FFmpeg argument vectors
//!
//! Pure builders so the exact command lines can be checked without running ffmpeg.

use std::path::Path;

/// Where a text overlay is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextPosition {
    #[default]
    Center,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl TextPosition {
    /// Unknown names fall back to center
    pub fn parse(name: &str) -> Self {
        match name {
            "top" => TextPosition::Top,
            "bottom" => TextPosition::Bottom,
            "top-left" => TextPosition::TopLeft,
            "top-right" => TextPosition::TopRight,
            "bottom-left" => TextPosition::BottomLeft,
            "bottom-right" => TextPosition::BottomRight,
            _ => TextPosition::Center,
        }
    }

    /// drawtext `x` and `y` expressions
    pub fn coordinates(self) -> (&'static str, &'static str) {
        match self {
            TextPosition::Center => ("(w-text_w)/2", "(h-text_h)/2"),
            TextPosition::Top => ("(w-text_w)/2", "50"),
            TextPosition::Bottom => ("(w-text_w)/2", "h-text_h-50"),
            TextPosition::TopLeft => ("50", "50"),
            TextPosition::TopRight => ("w-text_w-50", "50"),
            TextPosition::BottomLeft => ("50", "h-text_h-50"),
            TextPosition::BottomRight => ("w-text_w-50", "h-text_h-50"),
        }
    }
}

fn escape_filter_value(raw: &str) -> String {
    // `:` and `,` separate filter options, `\` escapes.
    raw.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace(',', r"\,")
        .replace('\'', r"\'")
}

/// Escape user text for drawtext, which also expands `%{...}`
pub fn escape_drawtext(raw: &str) -> String {
    escape_filter_value(raw).replace('%', r"\%")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

pub fn thumbnail_args(
    input: &Path,
    output: &Path,
    time_offset: f64,
    width: u32,
    height: u32,
) -> Vec<String> {
    let mut args = strings(&["-i"]);
    args.push(path_arg(input));
    args.extend(strings(&["-ss"]));
    args.push(time_offset.to_string());
    args.extend(strings(&["-vframes", "1", "-vf"]));
    args.push(format!("scale={}:{}", width, height));
    args.push("-y".to_string());
    args.push(path_arg(output));
    args
}

/// Re-encode for the web. Scaling only applies when both dimensions are given.
pub fn convert_args(
    input: &Path,
    output: &Path,
    format: &str,
    width: Option<u32>,
    height: Option<u32>,
    bitrate: Option<&str>,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), path_arg(input)];

    if let (Some(w), Some(h)) = (width, height) {
        args.push("-vf".to_string());
        args.push(format!("scale={}:{}", w, h));
    }

    if let Some(bitrate) = bitrate {
        args.push("-b:v".to_string());
        args.push(bitrate.to_string());
    }

    match format {
        "mp4" => args.extend(strings(&[
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ])),
        "webm" => args.extend(strings(&["-c:v", "libvpx-vp9", "-c:a", "libopus"])),
        _ => {}
    }

    args.push("-y".to_string());
    args.push(path_arg(output));
    args
}

pub fn extract_audio_args(input: &Path, output: &Path, format: &str) -> Vec<String> {
    let codec = if format == "mp3" { "libmp3lame" } else { "copy" };
    let mut args = vec!["-i".to_string(), path_arg(input)];
    args.extend(strings(&["-vn", "-acodec", codec, "-y"]));
    args.push(path_arg(output));
    args
}

pub fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        path_arg(video),
        "-i".to_string(),
        path_arg(audio),
    ];
    args.extend(strings(&[
        "-c:v", "copy", "-c:a", "aac", "-map", "0:v:0", "-map", "1:a:0", "-shortest", "-y",
    ]));
    args.push(path_arg(output));
    args
}

pub fn trim_args(input: &Path, output: &Path, start: f64, duration: f64) -> Vec<String> {
    let mut args = vec!["-i".to_string(), path_arg(input)];
    args.push("-ss".to_string());
    args.push(start.to_string());
    args.push("-t".to_string());
    args.push(duration.to_string());
    args.extend(strings(&["-c", "copy", "-y"]));
    args.push(path_arg(output));
    args
}

pub fn drawtext_filter(text: &str, position: TextPosition, duration: Option<f64>) -> String {
    let (x, y) = position.coordinates();
    let mut filter = format!(
        "drawtext=text='{}':fontsize=24:fontcolor=white:x={}:y={}",
        escape_drawtext(text),
        x,
        y
    );
    if let Some(duration) = duration.filter(|d| *d > 0.0) {
        filter.push_str(&format!(":enable='between(t,0,{})'", duration));
    }
    filter
}

pub fn text_overlay_args(
    input: &Path,
    output: &Path,
    text: &str,
    position: TextPosition,
    duration: Option<f64>,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), path_arg(input), "-vf".to_string()];
    args.push(drawtext_filter(text, position, duration));
    args.extend(strings(&["-c:a", "copy", "-y"]));
    args.push(path_arg(output));
    args
}

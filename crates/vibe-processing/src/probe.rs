//! ffprobe output parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Metadata for a media file. Stream fields are absent when the stream is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub duration: f64,
    pub size: u64,
    pub format_name: String,
    pub bit_rate: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_bitrate: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

// ffprobe reports most numbers as strings
#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    size: Option<String>,
    format_name: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    bit_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
}

fn parse_num<T: std::str::FromStr + Default>(value: Option<&String>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// `num/den` frame rate. Malformed input or a zero denominator gives 0.
pub fn parse_frame_rate(rate: &str) -> f64 {
    let Some((num, den)) = rate.split_once('/') else {
        return rate.trim().parse().unwrap_or(0.0);
    };
    let num: f64 = num.trim().parse().unwrap_or(0.0);
    let den: f64 = den.trim().parse().unwrap_or(0.0);
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output
pub fn parse_probe_output(json: &str) -> Result<VideoInfo> {
    let probe: ProbeOutput =
        serde_json::from_str(json).context("Failed to parse ffprobe output")?;

    let mut info = VideoInfo {
        duration: parse_num(probe.format.duration.as_ref()),
        size: parse_num(probe.format.size.as_ref()),
        format_name: probe.format.format_name.unwrap_or_default(),
        bit_rate: parse_num(probe.format.bit_rate.as_ref()),
        ..Default::default()
    };

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    if let Some(stream) = video {
        info.width = Some(stream.width.unwrap_or(0));
        info.height = Some(stream.height.unwrap_or(0));
        info.fps = Some(
            stream
                .r_frame_rate
                .as_deref()
                .map(parse_frame_rate)
                .unwrap_or(0.0),
        );
        info.video_codec = Some(stream.codec_name.clone().unwrap_or_default());
        info.video_bitrate = Some(parse_num(stream.bit_rate.as_ref()));
    }

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));
    if let Some(stream) = audio {
        info.audio_codec = Some(stream.codec_name.clone().unwrap_or_default());
        info.audio_bitrate = Some(parse_num(stream.bit_rate.as_ref()));
        info.sample_rate = Some(parse_num(stream.sample_rate.as_ref()));
        info.channels = Some(stream.channels.unwrap_or(0));
    }

    Ok(info)
}

use serde::{Deserialize, Serialize};
use vibe_core::AppError;

use crate::formats::{OUTPUT_AUDIO_FORMATS, OUTPUT_VIDEO_FORMATS};

/// Options accepted by the upload processing endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bitrate: Option<String>,
    pub trim: Option<TrimOptions>,
    pub text_overlay: Option<TextOverlayOptions>,
    pub extract_audio: bool,
    pub audio_format: Option<String>,
    pub thumbnail: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimOptions {
    #[serde(default)]
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlayOptions {
    pub text: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl ProcessingOptions {
    /// Parse from the raw JSON body value; `null` means defaults
    pub fn from_value(value: Option<&serde_json::Value>) -> Result<Self, AppError> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| AppError::InvalidInput(format!("Invalid processing options: {}", e))),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(format) = &self.format {
            if !OUTPUT_VIDEO_FORMATS.contains(&format.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported output format: {}",
                    format
                )));
            }
        }

        if let Some(format) = &self.audio_format {
            if !OUTPUT_AUDIO_FORMATS.contains(&format.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "Unsupported audio format: {}",
                    format
                )));
            }
        }

        match (self.width, self.height) {
            (Some(w), Some(h)) if w == 0 || h == 0 => {
                return Err(AppError::InvalidInput(
                    "Width and height must be positive".to_string(),
                ));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::InvalidInput(
                    "Width and height must be provided together".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(trim) = &self.trim {
            if trim.duration <= 0.0 || trim.start < 0.0 {
                return Err(AppError::InvalidInput(
                    "Trim duration must be positive".to_string(),
                ));
            }
        }

        if let Some(overlay) = &self.text_overlay {
            if overlay.text.trim().is_empty() {
                return Err(AppError::InvalidInput(
                    "Text overlay requires text".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn output_format(&self) -> &str {
        self.format.as_deref().unwrap_or("mp4")
    }

    pub fn audio_output_format(&self) -> &str {
        self.audio_format.as_deref().unwrap_or("mp3")
    }
}

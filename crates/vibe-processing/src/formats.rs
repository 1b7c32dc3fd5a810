use serde::Serialize;

pub const INPUT_VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv", "3gp"];
pub const INPUT_AUDIO_FORMATS: &[&str] = &["mp3", "wav", "aac", "ogg", "m4a", "flac"];
pub const OUTPUT_VIDEO_FORMATS: &[&str] = &["mp4", "webm", "avi", "mov"];
pub const OUTPUT_AUDIO_FORMATS: &[&str] = &["mp3", "wav", "aac", "ogg"];

#[derive(Debug, Clone, Serialize)]
pub struct SupportedFormats {
    pub input_video: &'static [&'static str],
    pub input_audio: &'static [&'static str],
    pub output_video: &'static [&'static str],
    pub output_audio: &'static [&'static str],
}

pub fn supported_formats() -> SupportedFormats {
    SupportedFormats {
        input_video: INPUT_VIDEO_FORMATS,
        input_audio: INPUT_AUDIO_FORMATS,
        output_video: OUTPUT_VIDEO_FORMATS,
        output_audio: OUTPUT_AUDIO_FORMATS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats_serialize() {
        let json = serde_json::to_value(supported_formats()).unwrap();
        assert_eq!(json["input_video"].as_array().unwrap().len(), 8);
        assert_eq!(json["output_audio"][0], "mp3");
    }
}

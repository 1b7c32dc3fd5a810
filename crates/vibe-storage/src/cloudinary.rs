//! Cloudinary backend
//!
//! Uploads go through the signed REST upload API. Request signatures are the
//! SHA-256 digest of the alphabetically sorted `key=value` parameters joined with
//! `&`, followed by the API secret.

use crate::keys::dotted_extension;
use crate::traits::{FileUpload, ServiceInfo, StorageError, StorageResult, StorageService, StoredFile};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;
use vibe_core::config::CloudinaryConfig;
use vibe_core::StorageProvider;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Eager transformations requested for videos: a JPG thumbnail and a 640x480 preview
const VIDEO_EAGER: &str = "w_300,h_200,c_fill,f_jpg|w_640,h_480,c_limit,f_mp4";

const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm", ".mkv"];
const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".aac", ".ogg", ".m4a", ".flac"];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg"];

#[derive(Clone)]
pub struct CloudinaryStorage {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    bytes: Option<u64>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    resource_type: Option<String>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    eager: Vec<EagerResult>,
}

#[derive(Debug, Deserialize)]
struct EagerResult {
    secure_url: String,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

impl CloudinaryStorage {
    pub fn new(config: &CloudinaryConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(CloudinaryStorage {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", API_BASE, self.cloud_name, resource_type, action)
    }

    fn signed_params(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        let signature = sign_params(&params, &self.api_secret);
        params.insert("api_key", self.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }

    async fn read_error(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("Cloudinary returned status {}", status),
        }
    }
}

/// Signature over every non-empty parameter, sorted by name
pub(crate) fn sign_params(params: &BTreeMap<&'static str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

/// Cloudinary resource type for an upload. Audio is stored as `video`.
pub(crate) fn resource_type_for(content_type: Option<&str>, filename: &str) -> &'static str {
    if let Some(content_type) = content_type {
        if content_type.starts_with("video/") || content_type.starts_with("audio/") {
            return "video";
        }
        if content_type.starts_with("image/") {
            return "image";
        }
    }

    let ext = dotted_extension(filename);
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) || AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        "video"
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        "image"
    } else {
        "raw"
    }
}

/// Public id from a delivery URL: the path after `upload/`, without the
/// optional `v<digits>` version segment and without the file extension.
pub(crate) fn extract_public_id(file_url: &str) -> Option<String> {
    if !file_url.contains("cloudinary.com") {
        return None;
    }
    let without_query = file_url.split('?').next().unwrap_or(file_url);
    let (_, rest) = without_query.split_once("/upload/")?;

    let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(first) = segments.first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            segments.remove(0);
        }
    }

    let last = segments.pop()?;
    let stem = match last.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => last,
    };
    segments.push(stem);

    Some(segments.join("/"))
}

/// Resource type embedded in a delivery URL, defaulting to `image`
pub(crate) fn resource_type_from_url(file_url: &str) -> &'static str {
    if file_url.contains("/video/upload/") {
        "video"
    } else if file_url.contains("/raw/upload/") {
        "raw"
    } else {
        "image"
    }
}

fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl StorageService for CloudinaryStorage {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Cloudinary
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo::active(
            "Cloudinary",
            "25GB storage + 25GB bandwidth/month",
            "Vibe Video Editor files",
        )
    }

    async fn upload(&self, file: &FileUpload) -> StorageResult<StoredFile> {
        let resource_type = resource_type_for(file.content_type.as_deref(), &file.filename);
        let public_id = format!("{}/{}/{}", file.user_id, file.file_type, Uuid::new_v4());
        let size = file.size();

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.clone());
        params.insert("folder", format!("video-editor/{}", file.user_id));
        params.insert("tags", format!("{},{}", file.file_type, file.user_id));
        params.insert(
            "context",
            format!(
                "user_id={}|file_type={}|original_filename={}",
                file.user_id,
                escape_context(&file.file_type),
                escape_context(&file.filename)
            ),
        );
        params.insert("timestamp", unix_timestamp().to_string());
        if resource_type == "video" {
            params.insert("eager", VIDEO_EAGER.to_string());
            params.insert("eager_async", "true".to_string());
        }

        let mut form = Form::new();
        for (key, value) in self.signed_params(params) {
            form = form.text(key, value);
        }
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.filename.clone())
            .mime_str(file.content_type_or_default())
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        form = form.part("file", part);

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint(resource_type, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    public_id = %public_id,
                    size_bytes = size,
                    "Cloudinary upload request failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        if !response.status().is_success() {
            let message = Self::read_error(response).await;
            tracing::error!(
                error = %message,
                public_id = %public_id,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Cloudinary upload rejected"
            );
            return Err(StorageError::UploadFailed(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        tracing::info!(
            public_id = %body.public_id,
            resource_type = resource_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        let thumbnail_url = body
            .eager
            .iter()
            .find(|e| e.format.as_deref() == Some("jpg"))
            .or_else(|| body.eager.first())
            .map(|e| e.secure_url.clone());

        Ok(StoredFile {
            success: true,
            file_id: Some(body.public_id.clone()),
            public_id: Some(body.public_id.clone()),
            file_name: body.public_id,
            download_url: body.secure_url,
            file_size: body.bytes.unwrap_or(size),
            content_type: file.content_type.clone(),
            service: StorageProvider::Cloudinary,
            metadata: json!({
                "resource_type": body.resource_type.as_deref().unwrap_or(resource_type),
                "format": body.format,
                "width": body.width,
                "height": body.height,
                "duration": body.duration,
            }),
            thumbnail_url,
        })
    }

    async fn delete(&self, file_url: &str) -> StorageResult<bool> {
        let Some(public_id) = extract_public_id(file_url) else {
            tracing::warn!(url = %file_url, "Could not extract Cloudinary public id");
            return Ok(false);
        };
        let resource_type = resource_type_from_url(file_url);

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.clone());
        params.insert("timestamp", unix_timestamp().to_string());

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&self.signed_params(params))
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;

        if !response.status().is_success() {
            let message = Self::read_error(response).await;
            tracing::error!(error = %message, public_id = %public_id, "Cloudinary delete failed");
            return Err(StorageError::DeleteFailed(message));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        let deleted = body.result == "ok";
        tracing::info!(
            public_id = %public_id,
            result = %body.result,
            "Cloudinary delete finished"
        );
        Ok(deleted)
    }

    async fn signed_url(&self, file_url: &str, expires_in: Duration) -> StorageResult<String> {
        let public_id = extract_public_id(file_url)
            .ok_or_else(|| StorageError::InvalidKey(file_url.to_string()))?;
        let resource_type = resource_type_from_url(file_url);
        let now = unix_timestamp();

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id);
        params.insert("timestamp", now.to_string());
        params.insert(
            "expires_at",
            (now + expires_in.as_secs() as i64).to_string(),
        );
        let path = file_url.split('?').next().unwrap_or(file_url);
        if let Some(format) = path
            .rsplit('/')
            .next()
            .and_then(|last| last.rsplit_once('.'))
            .map(|(_, ext)| ext.to_string())
        {
            params.insert("format", format);
        }

        let query = self
            .signed_params(params)
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}?{}", self.endpoint(resource_type, "download"), query))
    }
}

/// Escape the separators of Cloudinary's `key=value|key=value` context string
fn escape_context(value: &str) -> String {
    value.replace('|', "\\|").replace('=', "\\=")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorted_and_skips_empty() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("tags", String::new());

        let expected = hex::encode(Sha256::digest(
            b"public_id=sample_image&timestamp=1315060510abcd",
        ));
        assert_eq!(sign_params(&params, "abcd"), expected);
    }

    #[test]
    fn test_resource_type_for_content_type() {
        assert_eq!(resource_type_for(Some("video/mp4"), "x.bin"), "video");
        assert_eq!(resource_type_for(Some("audio/mpeg"), "x.bin"), "video");
        assert_eq!(resource_type_for(Some("image/png"), "x.bin"), "image");
    }

    #[test]
    fn test_resource_type_for_extension() {
        assert_eq!(resource_type_for(None, "clip.MKV"), "video");
        assert_eq!(resource_type_for(None, "song.flac"), "video");
        assert_eq!(resource_type_for(Some("application/octet-stream"), "pic.webp"), "image");
        assert_eq!(resource_type_for(None, "notes.txt"), "raw");
        assert_eq!(resource_type_for(None, "noext"), "raw");
    }

    #[test]
    fn test_extract_public_id_with_version() {
        let url = "https://res.cloudinary.com/demo/video/upload/v1700000000/video-editor/7/7/editor_video/abc.mp4";
        assert_eq!(
            extract_public_id(url).as_deref(),
            Some("video-editor/7/7/editor_video/abc")
        );
    }

    #[test]
    fn test_extract_public_id_without_version() {
        let url = "https://res.cloudinary.com/demo/image/upload/sample.jpg";
        assert_eq!(extract_public_id(url).as_deref(), Some("sample"));
    }

    #[test]
    fn test_extract_public_id_rejects_foreign_urls() {
        assert!(extract_public_id("https://example.com/upload/a.jpg").is_none());
        assert!(extract_public_id("https://res.cloudinary.com/demo/image/fetch/a.jpg").is_none());
    }

    #[test]
    fn test_resource_type_from_url() {
        assert_eq!(resource_type_from_url("https://res.cloudinary.com/d/video/upload/a.mp4"), "video");
        assert_eq!(resource_type_from_url("https://res.cloudinary.com/d/raw/upload/a.txt"), "raw");
        assert_eq!(resource_type_from_url("https://res.cloudinary.com/d/image/upload/a.png"), "image");
    }

    #[tokio::test]
    async fn test_signed_url_contains_signature() {
        let storage = CloudinaryStorage::new(&CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "123".to_string(),
            api_secret: "secret".to_string(),
        })
        .unwrap();

        let url = storage
            .signed_url(
                "https://res.cloudinary.com/demo/video/upload/v1/a/b.mp4",
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert!(url.starts_with("https://api.cloudinary.com/v1_1/demo/video/download?"));
        assert!(url.contains("public_id=a%2Fb"));
        assert!(url.contains("format=mp4"));
        assert!(url.contains("api_key=123"));
        assert!(url.contains("signature="));
    }

    #[test]
    fn test_context_values_are_escaped() {
        assert_eq!(escape_context("clip.mp4"), "clip.mp4");
        assert_eq!(escape_context("a|b=c.mp4"), "a\\|b\\=c.mp4");
    }
}

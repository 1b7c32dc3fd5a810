use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::storage_types::StorageProvider;

/// Kind of media an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "asset_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Video,
    Audio,
    Image,
    Document,
}

impl AssetType {
    /// Best guess from a MIME type, used for multipart uploads without an explicit type
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type.split('/').next().unwrap_or_default() {
            "video" => AssetType::Video,
            "audio" => AssetType::Audio,
            "image" => AssetType::Image,
            _ => AssetType::Document,
        }
    }
}

impl FromStr for AssetType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "video" => Ok(AssetType::Video),
            "audio" => Ok(AssetType::Audio),
            "image" => Ok(AssetType::Image),
            "document" => Ok(AssetType::Document),
            _ => Err(anyhow::anyhow!("Invalid asset type: {}", s)),
        }
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetType::Video => write!(f, "video"),
            AssetType::Audio => write!(f, "audio"),
            AssetType::Image => write!(f, "image"),
            AssetType::Document => write!(f, "document"),
        }
    }
}

/// A stored media file owned by a user, optionally attached to a project
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub storage_provider: StorageProvider,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub asset_metadata: serde_json::Value,
    /// Set when the server stored the file itself; only these files are signed
    /// or deleted in the backend
    pub storage_managed: bool,
    pub created_at: DateTime<Utc>,
}

/// Values for a new asset row, after request validation
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub storage_provider: StorageProvider,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub asset_metadata: serde_json::Value,
    pub storage_managed: bool,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAssetRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Asset name must be at most 255 characters"))]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub storage_provider: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "File path must be at most 500 characters"))]
    pub file_path: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateAssetRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Asset name must be between 1 and 255 characters"
    ))]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub storage_provider: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 500,
        message = "File path must be between 1 and 500 characters"
    ))]
    pub file_path: Option<String>,
    #[serde(default)]
    pub asset_metadata: Option<serde_json::Value>,
}

/// Parsed form of `UpdateAssetRequest`
#[derive(Debug, Default, Clone)]
pub struct AssetChanges {
    pub asset_name: Option<String>,
    pub asset_type: Option<AssetType>,
    pub storage_provider: Option<StorageProvider>,
    pub file_path: Option<String>,
    pub asset_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetSummary {
    pub id: i64,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetDetail {
    pub id: i64,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub storage_provider: StorageProvider,
    pub file_path: String,
    pub asset_metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Time-limited URL for downloading the file
    pub download_url: String,
}

impl From<Asset> for AssetSummary {
    fn from(asset: Asset) -> Self {
        AssetSummary {
            id: asset.id,
            asset_name: asset.asset_name,
            asset_type: asset.asset_type,
            file_path: asset.file_path,
            created_at: asset.created_at,
        }
    }
}

impl AssetDetail {
    pub fn new(asset: Asset, download_url: String) -> Self {
        AssetDetail {
            id: asset.id,
            asset_name: asset.asset_name,
            asset_type: asset.asset_type,
            storage_provider: asset.storage_provider,
            file_path: asset.file_path,
            asset_metadata: asset.asset_metadata,
            created_at: asset.created_at,
            download_url,
        }
    }
}

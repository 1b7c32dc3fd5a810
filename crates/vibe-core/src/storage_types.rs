use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use utoipa::ToSchema;

/// Cloud storage providers a file can live in
///
/// Defined in core because it's stored on assets and projects and used by the
/// storage router.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "storage_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Firebase,
    Cloudinary,
    Backblaze,
}

impl StorageProvider {
    pub const ALL: [StorageProvider; 3] = [
        StorageProvider::Backblaze,
        StorageProvider::Cloudinary,
        StorageProvider::Firebase,
    ];
}

impl FromStr for StorageProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firebase" => Ok(StorageProvider::Firebase),
            "cloudinary" => Ok(StorageProvider::Cloudinary),
            "backblaze" => Ok(StorageProvider::Backblaze),
            _ => Err(anyhow::anyhow!("Invalid storage provider: {}", s)),
        }
    }
}

impl Display for StorageProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageProvider::Firebase => write!(f, "firebase"),
            StorageProvider::Cloudinary => write!(f, "cloudinary"),
            StorageProvider::Backblaze => write!(f, "backblaze"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_parse_is_case_insensitive() {
        assert_eq!(
            "Cloudinary".parse::<StorageProvider>().unwrap(),
            StorageProvider::Cloudinary
        );
        assert!("dropbox".parse::<StorageProvider>().is_err());
    }

    #[test]
    fn test_storage_provider_display_matches_serde() {
        for provider in StorageProvider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider));
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_hex_color;

/// Custom domain and branding for a reseller account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WhiteLabelConfig {
    pub id: i64,
    pub user_id: i64,
    pub custom_domain: String,
    pub domain_verified: bool,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateWhiteLabelRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Custom domain must be at most 255 characters"))]
    pub custom_domain: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Logo URL must be at most 500 characters"))]
    pub logo_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Favicon URL must be at most 500 characters"))]
    pub favicon_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary_color: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "Invalid contact email"),
        length(max = 120, message = "Contact email must be at most 120 characters")
    )]
    pub contact_email: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateWhiteLabelRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Custom domain must be between 1 and 255 characters"
    ))]
    pub custom_domain: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Logo URL must be at most 500 characters"))]
    pub logo_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500, message = "Favicon URL must be at most 500 characters"))]
    pub favicon_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub primary_color: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_hex_color"))]
    pub secondary_color: Option<String>,
    #[serde(default)]
    #[validate(
        email(message = "Invalid contact email"),
        length(max = 120, message = "Contact email must be at most 120 characters")
    )]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub domain_verified: Option<bool>,
}

/// Branding attached to requests that arrive on a verified custom domain
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhiteLabelBranding {
    pub custom_domain: String,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub contact_email: Option<String>,
}

impl From<&WhiteLabelConfig> for WhiteLabelBranding {
    fn from(config: &WhiteLabelConfig) -> Self {
        WhiteLabelBranding {
            custom_domain: config.custom_domain.clone(),
            logo_url: config.logo_url.clone(),
            favicon_url: config.favicon_url.clone(),
            primary_color: config.primary_color.clone(),
            secondary_color: config.secondary_color.clone(),
            contact_email: config.contact_email.clone(),
        }
    }
}

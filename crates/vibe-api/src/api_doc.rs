//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use vibe_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the `bearer_auth` scheme referenced by protected handlers
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vibe Video Editor API",
        version = "1.0.0",
        description = "Backend for the Vibe video editor: accounts, projects and assets, subscriptions, white-labeling, multi-provider storage and FFmpeg processing."
    ),
    modifiers(&BearerAuth),
    paths(
        handlers::index::index,
        // Auth
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::profile,
        // Projects
        handlers::projects::create_project,
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        // Assets
        handlers::assets::create_asset,
        handlers::assets::upload_asset,
        handlers::assets::list_assets,
        handlers::assets::get_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        // Storage
        handlers::storage::storage_status,
        handlers::storage::storage_info,
        // Subscriptions
        handlers::subscriptions::list_plans,
        handlers::subscriptions::subscribe,
        handlers::subscriptions::list_transactions,
        // White label
        handlers::white_label::create_config,
        handlers::white_label::get_config,
        handlers::white_label::update_config,
        handlers::white_label::delete_config,
        // Editor
        handlers::editor::process_video,
        handlers::editor::render_video,
        handlers::editor::export_video,
        // Upload
        handlers::upload::upload_video,
        handlers::upload::get_status,
        handlers::upload::process_video,
        handlers::upload::supported_formats,
    ),
    components(
        schemas(
            models::UserResponse,
            models::UserProfile,
            models::ProjectSummary,
            models::ProjectDetail,
            models::AssetSummary,
            models::AssetDetail,
            models::SubscriptionPlan,
            models::TransactionSummary,
            models::WhiteLabelConfig,
            models::WhiteLabelBranding,
            models::UploadedVideo,
            models::ProcessingStatus,
            handlers::index::ServiceInfoResponse,
            handlers::auth::AuthResponse,
            handlers::auth::ProfileResponse,
            handlers::projects::ProjectCreatedResponse,
            handlers::projects::MessageResponse,
            handlers::assets::AssetCreatedResponse,
            handlers::subscriptions::SubscribedResponse,
            handlers::white_label::WhiteLabelResponse,
            handlers::upload::UploadVideoResponse,
            handlers::upload::ProcessVideoResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "service", description = "Service banner"),
        (name = "auth", description = "Registration, login and profile"),
        (name = "projects", description = "Editor projects"),
        (name = "assets", description = "Project assets and file uploads to cloud storage"),
        (name = "storage", description = "Storage provider status"),
        (name = "subscriptions", description = "Plans, subscribing and transactions"),
        (name = "white-label", description = "Custom domain and branding"),
        (name = "editor", description = "Editor processing, render and export actions"),
        (name = "upload", description = "Raw video uploads and FFmpeg processing jobs")
    )
)]
pub struct ApiDoc;

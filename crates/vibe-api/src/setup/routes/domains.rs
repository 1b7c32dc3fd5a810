//! Route groups, one per API area.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

const AUTH_PREFIX: &str = "/api/auth";
const PROJECTS_PREFIX: &str = "/api/projects";
const ASSETS_PREFIX: &str = "/api/assets";
const STORAGE_PREFIX: &str = "/api/storage";
const SUBSCRIPTIONS_PREFIX: &str = "/api/subscriptions";
const WHITE_LABEL_PREFIX: &str = "/api/white-label";
const EDITOR_PREFIX: &str = "/api/editor";
const UPLOAD_PREFIX: &str = "/api/upload";

pub fn root_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::index::index))
        .with_state(state)
}

pub fn public_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/login", AUTH_PREFIX), post(handlers::auth::login))
        .route(
            &format!("{}/register", AUTH_PREFIX),
            post(handlers::auth::register),
        )
        .with_state(state)
}

pub fn public_subscription_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/subscription_plans", SUBSCRIPTIONS_PREFIX),
            get(handlers::subscriptions::list_plans),
        )
        .with_state(state)
}

pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/profile", AUTH_PREFIX),
            get(handlers::auth::profile),
        )
        .with_state(state)
}

pub fn project_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/projects", PROJECTS_PREFIX),
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            &format!("{}/projects/{{id}}", PROJECTS_PREFIX),
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .with_state(state)
}

pub fn asset_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/assets", ASSETS_PREFIX),
            post(handlers::assets::create_asset).get(handlers::assets::list_assets),
        )
        .route(
            &format!("{}/assets/upload", ASSETS_PREFIX),
            post(handlers::assets::upload_asset),
        )
        .route(
            &format!("{}/assets/{{id}}", ASSETS_PREFIX),
            get(handlers::assets::get_asset)
                .put(handlers::assets::update_asset)
                .delete(handlers::assets::delete_asset),
        )
        .with_state(state)
}

pub fn storage_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/status", STORAGE_PREFIX),
            get(handlers::storage::storage_status),
        )
        .route(
            &format!("{}/info", STORAGE_PREFIX),
            get(handlers::storage::storage_info),
        )
        .with_state(state)
}

pub fn subscription_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/subscribe", SUBSCRIPTIONS_PREFIX),
            post(handlers::subscriptions::subscribe),
        )
        .route(
            &format!("{}/transactions", SUBSCRIPTIONS_PREFIX),
            get(handlers::subscriptions::list_transactions),
        )
        .with_state(state)
}

pub fn white_label_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/white_label_config", WHITE_LABEL_PREFIX),
            post(handlers::white_label::create_config)
                .get(handlers::white_label::get_config)
                .put(handlers::white_label::update_config)
                .delete(handlers::white_label::delete_config),
        )
        .with_state(state)
}

pub fn editor_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/process_video", EDITOR_PREFIX),
            post(handlers::editor::process_video),
        )
        .route(
            &format!("{}/render_video", EDITOR_PREFIX),
            post(handlers::editor::render_video),
        )
        .route(
            &format!("{}/export_video", EDITOR_PREFIX),
            post(handlers::editor::export_video),
        )
        .with_state(state)
}

pub fn upload_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/video", UPLOAD_PREFIX),
            post(handlers::upload::upload_video),
        )
        .route(
            &format!("{}/status/{{id}}", UPLOAD_PREFIX),
            get(handlers::upload::get_status),
        )
        .route(
            &format!("{}/process", UPLOAD_PREFIX),
            post(handlers::upload::process_video),
        )
        .route(
            &format!("{}/formats", UPLOAD_PREFIX),
            get(handlers::upload::supported_formats),
        )
        .with_state(state)
}

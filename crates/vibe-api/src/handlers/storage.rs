use crate::auth::AuthUser;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

/// Which storage providers are configured
#[utoipa::path(
    get,
    path = "/api/storage/status",
    tag = "storage",
    responses((status = 200, description = "Provider availability")),
    security(("bearer_auth" = []))
)]
pub async fn storage_status(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> impl IntoResponse {
    Json(state.media.storage.get_service_status())
}

/// Description of every active provider
#[utoipa::path(
    get,
    path = "/api/storage/info",
    tag = "storage",
    responses((status = 200, description = "Active providers keyed by name")),
    security(("bearer_auth" = []))
)]
pub async fn storage_info(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> impl IntoResponse {
    Json(state.media.storage.get_storage_info())
}

use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;
use vibe_core::constants::{APP_NAME, APP_VERSION};
use vibe_core::models::WhiteLabelBranding;

use crate::middleware::MaybeWhiteLabel;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_label: Option<WhiteLabelBranding>,
}

/// Service banner, branded when the request came in on a verified custom domain
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfoResponse)
    )
)]
pub async fn index(MaybeWhiteLabel(white_label): MaybeWhiteLabel) -> impl IntoResponse {
    Json(ServiceInfoResponse {
        name: APP_NAME,
        version: APP_VERSION,
        status: "running",
        white_label: white_label.map(|ctx| WhiteLabelBranding::from(&ctx.config)),
    })
}

//! Client IP extraction for per-IP auth failure tracking

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};

use crate::state::AppState;

const UNKNOWN: &str = "unknown";

/// Resolve the client address: `X-Forwarded-For` (skipping `trusted_proxy_count`
/// hops from the right), then `X-Real-IP`, then the socket. Falls back to "unknown".
///
/// Forwarding headers are only read behind at least one trusted proxy, and a
/// forwarded chain no longer than the trusted hops is ignored.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    let socket_ip = || {
        socket_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    };

    if trusted_proxy_count == 0 {
        return socket_ip();
    }

    if let Some(value) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        return from_forwarded_for(value, trusted_proxy_count).unwrap_or_else(socket_ip);
    }

    if let Some(value) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if is_valid_ip(trimmed) {
            return trimmed.to_string();
        }
    }

    socket_ip()
}

/// Client address of the request, resolved with the configured trusted proxy count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let socket_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Ok(ClientIp(extract_client_ip(
            &parts.headers,
            socket_addr.as_ref(),
            state.config.trusted_proxy_count(),
        )))
    }
}

fn from_forwarded_for(value: &str, trusted_proxy_count: usize) -> Option<String> {
    let hops: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    // A chain no longer than the trusted hops carries no proxy-recorded client entry
    if hops.len() <= trusted_proxy_count {
        return None;
    }
    let candidate = hops[hops.len() - trusted_proxy_count - 1];

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(value: &str) -> bool {
    value.parse::<IpAddr>().is_ok()
}

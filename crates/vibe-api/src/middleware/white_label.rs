//! Custom-domain branding.
//!
//! Every request whose `Host` matches a verified white-label domain carries a
//! [`WhiteLabelContext`] in its extensions. Handlers read it with [`MaybeWhiteLabel`].

use std::convert::Infallible;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::HOST, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use lru::LruCache;
use tokio::sync::Mutex;
use vibe_core::models::WhiteLabelConfig;

use crate::state::AppState;

/// Owner and branding of the custom domain a request arrived on
#[derive(Debug, Clone)]
pub struct WhiteLabelContext {
    pub user_id: i64,
    pub config: WhiteLabelConfig,
}

/// Recent domain lookups, misses included, so unbranded hosts skip the database too
pub struct WhiteLabelCache {
    entries: Mutex<LruCache<String, (Option<WhiteLabelConfig>, Instant)>>,
    ttl: Duration,
}

impl WhiteLabelCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// `None` when the host is not cached or its entry expired
    pub async fn get(&self, host: &str) -> Option<Option<WhiteLabelConfig>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(host) {
            Some((config, expires_at)) if Instant::now() < *expires_at => {
                return Some(config.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(host);
        }
        None
    }

    pub async fn insert(&self, host: String, config: Option<WhiteLabelConfig>) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.lock().await.put(host, (config, expires_at));
    }

    /// Forget every lookup; called whenever a configuration changes
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

async fn resolve_domain(state: &AppState, host: &str) -> Option<WhiteLabelConfig> {
    if let Some(cached) = state.white_label_cache.get(host).await {
        return cached;
    }

    match state.db.white_labels.find_verified_by_domain(host).await {
        Ok(config) => {
            state
                .white_label_cache
                .insert(host.to_string(), config.clone())
                .await;
            config
        }
        Err(e) => {
            tracing::warn!(host = %host, error = %e, "White label lookup failed");
            None
        }
    }
}

/// Host to look up, without port. `None` for local and missing hosts.
fn lookup_host(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(HOST)?.to_str().ok()?.trim();
    if raw.is_empty() || raw.starts_with("127.0.0.1") {
        return None;
    }
    let host = match raw.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => raw,
    };
    if host.is_empty() || host.eq_ignore_ascii_case("localhost") {
        return None;
    }
    Some(host.to_string())
}

pub async fn white_label_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(host) = lookup_host(request.headers()) {
        if let Some(config) = resolve_domain(&state, &host).await {
            tracing::debug!(host = %host, user_id = config.user_id, "White label domain matched");
            request.extensions_mut().insert(WhiteLabelContext {
                user_id: config.user_id,
                config,
            });
        }
    }

    next.run(request).await
}

/// Extractor for the optional white-label context; never rejects
#[derive(Debug, Clone)]
pub struct MaybeWhiteLabel(pub Option<WhiteLabelContext>);

impl<S> FromRequestParts<S> for MaybeWhiteLabel
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeWhiteLabel(
            parts.extensions.get::<WhiteLabelContext>().cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_host(host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    #[test]
    fn test_lookup_host_strips_port() {
        assert_eq!(
            lookup_host(&headers_with_host("studio.example.com:8443")),
            Some("studio.example.com".to_string())
        );
    }

    #[test]
    fn test_lookup_host_skips_local_hosts() {
        assert_eq!(lookup_host(&headers_with_host("localhost:5000")), None);
        assert_eq!(lookup_host(&headers_with_host("127.0.0.1:5000")), None);
        assert_eq!(lookup_host(&headers_with_host("127.0.0.1")), None);
        assert_eq!(lookup_host(&HeaderMap::new()), None);
    }

    #[test]
    fn test_lookup_host_without_port() {
        assert_eq!(
            lookup_host(&headers_with_host("video.acme.io")),
            Some("video.acme.io".to_string())
        );
    }

    fn sample_config() -> WhiteLabelConfig {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "user_id": 7,
            "custom_domain": "video.acme.io",
            "domain_verified": true,
            "logo_url": null,
            "favicon_url": null,
            "primary_color": "#ff0000",
            "secondary_color": null,
            "contact_email": null,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cache_keeps_hits_and_misses() {
        let cache = WhiteLabelCache::new(Duration::from_secs(60), 8);
        assert!(cache.get("video.acme.io").await.is_none());

        cache.insert("video.acme.io".to_string(), Some(sample_config())).await;
        cache.insert("api.vibe.test".to_string(), None).await;

        let hit = cache.get("video.acme.io").await.unwrap().unwrap();
        assert_eq!(hit.user_id, 7);
        assert!(cache.get("api.vibe.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_entries_expire_and_clear() {
        let cache = WhiteLabelCache::new(Duration::ZERO, 8);
        cache.insert("video.acme.io".to_string(), Some(sample_config())).await;
        assert!(cache.get("video.acme.io").await.is_none());

        let cache = WhiteLabelCache::new(Duration::from_secs(60), 8);
        cache.insert("video.acme.io".to_string(), None).await;
        cache.clear().await;
        assert!(cache.get("video.acme.io").await.is_none());
    }
}

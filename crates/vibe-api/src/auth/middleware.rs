use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use lru::LruCache;
use tokio::sync::Mutex;
use vibe_core::AppError;

use crate::auth::models::AuthUser;
use crate::auth::JwtService;
use crate::error::HttpAppError;
use crate::utils::ip_extraction::extract_client_ip;

/// Distinct client IPs tracked at once; the least recently seen is dropped first
const MAX_TRACKED_IPS: usize = 10_000;

/// Counts failed authentication attempts per client IP within a window
pub struct AuthFailureLimiter {
    inner: Mutex<LruCache<String, (u32, Instant)>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self::with_capacity(max_failures, window_seconds, MAX_TRACKED_IPS)
    }

    pub fn with_capacity(max_failures: u32, window_seconds: u64, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Returns true once the IP has reached the limit
    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        evict_expired(&mut guard, now);

        let window = self.window;
        let (count, reset_at) = guard.get_or_insert_mut(ip.to_string(), || (0, now + window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let entry = guard.peek(ip).copied();
        match entry {
            Some((_, reset_at)) if Instant::now() >= reset_at => {
                guard.pop(ip);
                false
            }
            Some((count, _)) => count >= self.max_failures,
            None => false,
        }
    }

    #[cfg(test)]
    async fn tracked_ips(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Drop expired windows from the least recently used end
fn evict_expired(cache: &mut LruCache<String, (u32, Instant)>, now: Instant) {
    while let Some((_, (_, reset_at))) = cache.peek_lru() {
        if now < *reset_at {
            break;
        }
        cache.pop_lru();
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
    pub trusted_proxy_count: usize,
}

pub(crate) fn too_many_attempts() -> Response {
    HttpAppError(AppError::TooManyRequests(
        "Too many failed auth attempts".to_string(),
    ))
    .into_response()
}

/// 401 for this attempt; once the limit is reached, later attempts get 429
async fn reject(auth_state: &AuthState, client_ip: &str, message: &str) -> Response {
    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.record_failure(client_ip).await {
            tracing::warn!(client_ip = %client_ip, "Auth failure limit reached");
        }
    }
    tracing::debug!(client_ip = %client_ip, reason = message, "Authentication failed");
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client_ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        auth_state.trusted_proxy_count,
    );

    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.is_blocked(&client_ip).await {
            return too_many_attempts();
        }
    }

    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return reject(&auth_state, &client_ip, "Missing authorization header").await,
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return reject(
            &auth_state,
            &client_ip,
            "Invalid authorization header format",
        )
        .await;
    };

    match auth_state.jwt.verify(token.trim()) {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(AppError::Unauthorized(message)) => reject(&auth_state, &client_ip, &message).await,
        Err(e) => HttpAppError(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limiter_blocks_after_max_failures() {
        let limiter = AuthFailureLimiter::new(3, 900);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.is_blocked("1.2.3.4").await);
        assert!(limiter.record_failure("1.2.3.4").await);
        assert!(limiter.is_blocked("1.2.3.4").await);
        assert!(!limiter.is_blocked("5.6.7.8").await);
    }

    #[tokio::test]
    async fn test_limiter_window_expires() {
        let limiter = AuthFailureLimiter::new(1, 0);
        assert!(limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.is_blocked("1.2.3.4").await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted_on_record() {
        let limiter = AuthFailureLimiter::new(10, 0);
        for i in 0..5000 {
            limiter.record_failure(&format!("ip-{}", i)).await;
        }
        assert!(limiter.tracked_ips().await <= 1);
    }

    #[tokio::test]
    async fn test_tracked_ips_are_bounded() {
        let limiter = AuthFailureLimiter::with_capacity(10, 900, 100);
        for i in 0..1000 {
            limiter.record_failure(&format!("ip-{}", i)).await;
        }
        assert_eq!(limiter.tracked_ips().await, 100);
        assert!(!limiter.is_blocked("ip-0").await);
    }
}

//! Application-layer rate limiting for sign-in and sign-up

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

/// Sign-in: 5 requests per minute per IP
pub const LOGIN_LIMIT: (u32, u64) = (5, 60);
/// Sign-up: 3 requests per minute per IP
pub const REGISTER_LIMIT: (u32, u64) = (3, 60);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the request is allowed
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.inner.lock().await.values().map(HashMap::len).sum()
    }
}

/// X-Forwarded-For first (reverse proxy), then the peer address
fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &AppState,
    route: &'static str,
    (max, window): (u32, u64),
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if !state.rate_limiter.check(route, &ip, max, window).await {
        tracing::warn!(target: "audit", route, ip = %ip, "Rate limit exceeded");
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(next.run(request).await)
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", LOGIN_LIMIT, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", REGISTER_LIMIT, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_max_requests_per_ip() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("register", "1.2.3.4", 3, 60).await);
        }
        assert!(!limiter.check("register", "1.2.3.4", 3, 60).await);
        // other IPs and routes are counted separately
        assert!(limiter.check("register", "5.6.7.8", 3, 60).await);
        assert!(limiter.check("login", "1.2.3.4", 3, 60).await);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_and_cleanup_forgets() {
        let limiter = RateLimiter::new();
        assert!(limiter.check("login", "ip", 1, 60).await);
        assert!(!limiter.check("login", "ip", 1, 60).await);

        tokio::time::advance(std::time::Duration::from_secs(61)).await;
        assert!(limiter.check("login", "ip", 1, 60).await);

        tokio::time::advance(std::time::Duration::from_secs(301)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, 0);
    }
}

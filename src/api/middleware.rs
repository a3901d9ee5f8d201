//! API key authentication and per-client rate limiting for the scoring routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tower_http::cors::CorsLayer;

use super::error::ApiError;
use crate::config::ServerConfig;

/// Security settings derived from [`ServerConfig`].
#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    /// Bearer token required on `/predict` and `/model`.
    pub api_key: Option<String>,
    /// Allowed CORS origins. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    /// Applied to `/predict` only.
    pub rate_limiter: Option<RateLimiter>,
    /// Key rate limiting on forwarding headers instead of the socket peer.
    pub trust_proxy: bool,
}

impl SecurityConfig {
    /// Take the security-related settings from the server config.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            cors_origins: config.cors_origins.clone(),
            rate_limiter: config
                .rate_limit
                .map(|n| RateLimiter::new(n, Duration::from_secs(60))),
            trust_proxy: config.trust_proxy,
        }
    }

    /// No authentication, no rate limit, permissive CORS.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Require `Authorization: Bearer <key>` on the scoring routes.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Limit `/predict` to `max_requests` per minute per client.
    pub fn with_rate_limit(max_requests: u32) -> Self {
        Self {
            rate_limiter: Some(RateLimiter::new(max_requests, Duration::from_secs(60))),
            ..Self::default()
        }
    }

    /// Restrict CORS to the given origins.
    pub fn with_cors_origins(origins: Vec<String>) -> Self {
        Self {
            cors_origins: Some(origins),
            ..Self::default()
        }
    }

    /// Trust `X-Forwarded-For` / `X-Real-IP` when identifying clients.
    pub fn trusting_proxy(mut self) -> Self {
        self.trust_proxy = true;
        self
    }

    /// Permissive when no origins are configured; invalid origins are skipped.
    pub fn cors_layer(&self) -> CorsLayer {
        let Some(origins) = &self.cors_origins else {
            return CorsLayer::permissive();
        };

        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    }
}

/// Number of tracked clients above which a check also sweeps idle entries.
const SWEEP_THRESHOLD: usize = 1024;

/// In-memory sliding-window rate limiter keyed by client IP.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    requests: Arc<Mutex<HashMap<IpAddr, Vec<Instant>>>>,
}

impl RateLimiter {
    /// Allow `max_requests` per client within any `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            requests: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `ip`. Returns false when the client is over its limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut requests = self.lock();

        if requests.len() >= SWEEP_THRESHOLD {
            requests.retain(|_, timestamps| {
                timestamps.retain(|&t| now.duration_since(t) < self.window);
                !timestamps.is_empty()
            });
        }

        let entry = requests.entry(ip).or_default();
        entry.retain(|&t| now.duration_since(t) < self.window);
        if entry.len() < self.max_requests as usize {
            entry.push(now);
            true
        } else {
            false
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, Vec<Instant>>> {
        // The map holds no invariants a panicking holder could break.
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Reject requests without the configured bearer token. A no-op when no key is set.
pub async fn auth_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected_key) = &config.api_key else {
        return Ok(next.run(request).await);
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if token == expected_key => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            Err(ApiError::Unauthorized("Invalid API key"))
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(ApiError::Unauthorized("Missing bearer token"))
        }
    }
}

/// Enforce the per-client limit. A no-op when no limiter is configured.
pub async fn rate_limit_middleware(
    State(config): State<SecurityConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(rate_limiter) = &config.rate_limiter else {
        return Ok(next.run(request).await);
    };
    let ip = client_ip(&request, config.trust_proxy);

    if rate_limiter.check(ip) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Rate limit exceeded for IP: {}", ip);
        Err(ApiError::RateLimited)
    }
}

/// Client address: the socket peer, or loopback when the server was not built
/// with connect info. Forwarding headers are read only when `trust_proxy` is set.
fn client_ip(request: &Request<Body>, trust_proxy: bool) -> IpAddr {
    let header_ip = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    let forwarded = if trust_proxy {
        header_ip("X-Forwarded-For").or_else(|| header_ip("X-Real-IP"))
    } else {
        None
    };

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

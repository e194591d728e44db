//! Rate limiting middleware.
//!
//! Sliding-window counter per client key. The key is the left-most
//! `x-forwarded-for` entry when present, so deployments behind a proxy
//! limit real clients rather than the proxy itself.

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use tower::{Layer, Service};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: usize,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 300,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Default)]
struct RateLimiterState {
    requests: HashMap<String, Vec<Instant>>,
}

impl RateLimiterState {
    fn check(&mut self, key: &str, config: &RateLimitConfig) -> bool {
        let now = Instant::now();
        let cutoff = now - config.window;

        let requests = self.requests.entry(key.to_string()).or_default();
        requests.retain(|&time| time > cutoff);

        if requests.len() < config.max_requests {
            requests.push(now);
            true
        } else {
            false
        }
    }
}

/// Rate limiting layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<Mutex<RateLimiterState>>,
    config: RateLimitConfig,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimiterState::default())),
            config,
        }
    }
}

impl Default for RateLimitLayer {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: self.state.clone(),
            config: self.config.clone(),
        }
    }
}

/// Rate limiting service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<Mutex<RateLimiterState>>,
    config: RateLimitConfig,
}

impl<S> Service<Request> for RateLimitService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let state = self.state.clone();
        let config = self.config.clone();

        let key = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| "local".to_string());

        Box::pin(async move {
            let allowed = state.lock().await.check(&key, &config);

            if !allowed {
                let body = json!({
                    "error": "rate_limited",
                    "message": "Rate limit exceeded. Please try again later.",
                });
                return Ok((StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response());
            }

            inner.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_allows_then_refuses() {
        let config = RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        };
        let mut state = RateLimiterState::default();
        assert!(state.check("10.0.0.1", &config));
        assert!(state.check("10.0.0.1", &config));
        assert!(!state.check("10.0.0.1", &config));
        // other clients are unaffected
        assert!(state.check("10.0.0.2", &config));
    }
}

//! Admission control middleware using a token bucket.
//!
//! A single bucket gates every request except the liveness probe: a request
//! either takes a token immediately or is rejected with 429 before any
//! protocol logic or storage call runs. Refill is continuous and computed
//! inside the limiter, decoupled from request handling. Configuring a rate
//! of zero disables limiting entirely.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use deaddrop_core::config::RateLimitConfig;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Type alias for the unkeyed (global) token-bucket limiter.
type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Rate limiter state shared across requests.
///
/// Owned by [`crate::state::AppState`] and handed to the middleware at
/// router construction; there is no ambient global.
#[derive(Clone)]
pub struct RateLimitState {
    inner: Option<Arc<DirectLimiter>>,
}

impl RateLimitState {
    /// Create a new rate limit state from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        let Some(rate) = NonZeroU32::new(config.requests_per_second) else {
            return Self { inner: None };
        };
        let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rate).allow_burst(burst);

        Self {
            inner: Some(Arc::new(RateLimiter::direct(quota))),
        }
    }

    /// Check if rate limiting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Try to take one token. Never blocks and never queues.
    pub fn check(&self) -> Result<(), RateLimitError> {
        let Some(limiter) = &self.inner else {
            return Ok(());
        };

        match limiter.check() {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait_time =
                    not_until.wait_time_from(governor::clock::Clock::now(&DefaultClock::default()));
                Err(RateLimitError {
                    retry_after_secs: wait_time.as_secs() + 1,
                })
            }
        }
    }
}

/// Error returned when the bucket is empty.
#[derive(Debug)]
pub struct RateLimitError {
    /// Number of seconds to wait before retrying.
    pub retry_after_secs: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": "rate_limit_exceeded",
            "message": format!("Rate limit exceeded. Retry after {} seconds.", self.retry_after_secs),
            "retry_after": self.retry_after_secs,
        });

        (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", self.retry_after_secs.to_string())],
            Json(body),
        )
            .into_response()
    }
}

/// Admission middleware: take a token or reject with 429.
///
/// The liveness probe is exempt so orchestrator health checks cannot be
/// starved by client traffic.
pub async fn admission_middleware(
    State(rate_limit): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    match rate_limit.check() {
        Ok(()) => next.run(req).await,
        Err(e) => {
            // Admission rejection is expected under load, not an error.
            tracing::debug!(
                path = %req.uri().path(),
                retry_after_secs = e.retry_after_secs,
                "request rejected by rate limiter"
            );
            e.into_response()
        }
    }
}

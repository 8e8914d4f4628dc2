//! Rate limiting middleware for axum.
//!
//! Applies one fixed-window policy per route through the `RateLimiter` port.
//! Rate limit status is returned in standard HTTP headers:
//! - `X-RateLimit-Limit`: Maximum requests allowed in the window
//! - `X-RateLimit-Remaining`: Requests remaining in the current window
//! - `X-RateLimit-Reset`: Seconds until the window resets
//! - `Retry-After`: Seconds to wait (only on 429 response)
//!
//! # Example
//!
//! ```ignore
//! let guard = RateLimitGuard::new(limiter, sink, RateLimitPolicy::per_window_secs(10, 60), true);
//! let route = post(handler).layer(middleware::from_fn_with_state(guard, rate_limit_middleware));
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{GatewayError, SecurityEvent, SecurityEventKind};
use crate::ports::{RateLimitDecision, RateLimitKey, RateLimitPolicy, RateLimiter, SecurityEventSink};

use super::client_ip::ClientIp;

/// Standard rate limit header names.
pub mod headers {
    use super::HeaderName;

    /// Maximum requests allowed in the window.
    pub static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
    /// Requests remaining in the current window.
    pub static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
    /// Seconds until the window resets.
    pub static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
}

/// Per-route rate limit state.
#[derive(Clone)]
pub struct RateLimitGuard {
    limiter: Arc<dyn RateLimiter>,
    security_sink: Arc<dyn SecurityEventSink>,
    policy: RateLimitPolicy,
    /// Off outside production.
    enforce: bool,
}

impl RateLimitGuard {
    pub fn new(
        limiter: Arc<dyn RateLimiter>,
        security_sink: Arc<dyn SecurityEventSink>,
        policy: RateLimitPolicy,
        enforce: bool,
    ) -> Self {
        Self {
            limiter,
            security_sink,
            policy,
            enforce,
        }
    }
}

/// Counts the request against `(client ip, path)` and rejects with 429 once
/// the window's quota is used up.
///
/// A limiter failure lets the request through.
pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    ClientIp(client_ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    if !guard.enforce {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let key = RateLimitKey::new(client_ip.clone(), path.clone());

    match guard.limiter.try_consume(&key, guard.policy).await {
        Ok(RateLimitDecision::Denied { limit, retry_after }) => {
            guard.security_sink.record(SecurityEvent::new(
                SecurityEventKind::RateLimitExceeded,
                client_ip,
                serde_json::json!({ "endpoint": path, "limit": limit }),
            ));
            rate_limit_response(limit, retry_after)
        }
        Ok(RateLimitDecision::Allowed {
            limit,
            remaining,
            reset_after,
        }) => {
            let mut response = next.run(request).await;
            add_rate_limit_headers(&mut response, limit, remaining, reset_after);
            response
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rate limiter unavailable");
            next.run(request).await
        }
    }
}

/// Whole seconds, rounded up, never below 1.
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

/// Create a 429 Too Many Requests response.
fn rate_limit_response(limit: u32, retry_after: Duration) -> Response {
    let mut response = ApiError(GatewayError::RateLimited {
        limit,
        retry_after_secs: ceil_secs(retry_after),
    })
    .into_response();
    add_rate_limit_headers(&mut response, limit, 0, retry_after);
    response
}

/// Add rate limit headers to a response.
fn add_rate_limit_headers(response: &mut Response, limit: u32, remaining: u32, reset_after: Duration) {
    let headers = response.headers_mut();
    headers.insert(headers::X_RATELIMIT_LIMIT.clone(), HeaderValue::from(limit));
    headers.insert(
        headers::X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(remaining),
    );
    headers.insert(
        headers::X_RATELIMIT_RESET.clone(),
        HeaderValue::from(ceil_secs(reset_after)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rate_limiter::InMemoryRateLimiter;
    use crate::adapters::security::InMemorySecurityEventSink;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::{middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(enforce: bool, sink: InMemorySecurityEventSink) -> Router {
        let guard = RateLimitGuard::new(
            Arc::new(InMemoryRateLimiter::new()),
            Arc::new(sink),
            RateLimitPolicy::per_window_secs(2, 60),
            enforce,
        );
        Router::new().route(
            "/checkout",
            post(|| async { "ok" })
                .layer(middleware::from_fn_with_state(guard, rate_limit_middleware)),
        )
    }

    fn request() -> Request {
        axum::http::Request::post("/checkout")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn ceil_secs_rounds_up() {
        assert_eq!(ceil_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ceil_secs(Duration::from_secs(3)), 3);
        assert_eq!(ceil_secs(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn third_request_is_rejected_with_headers() {
        let sink = InMemorySecurityEventSink::new();
        let app = app(true, sink.clone());

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["x-ratelimit-remaining"], "1");

        app.clone().oneshot(request()).await.unwrap();
        let third = app.oneshot(request()).await.unwrap();

        assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(third.headers()["x-ratelimit-limit"], "2");
        assert_eq!(third.headers()["x-ratelimit-remaining"], "0");
        assert!(third.headers().contains_key("retry-after"));
        assert_eq!(sink.kinds(), vec![SecurityEventKind::RateLimitExceeded]);
        assert_eq!(sink.events()[0].client, "203.0.113.9");
    }

    #[tokio::test]
    async fn disabled_guard_never_limits() {
        let sink = InMemorySecurityEventSink::new();
        let app = app(false, sink.clone());

        for _ in 0..5 {
            let response = app.clone().oneshot(request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert!(sink.events().is_empty());
    }
}

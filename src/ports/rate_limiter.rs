//! Rate limiting port for the payment endpoints.
//!
//! The in-memory adapter keeps a per-process fixed-window table. A shared
//! counter store can implement the same trait for multi-instance deployments.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Port for rate limiting operations.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` under `policy`.
    ///
    /// Denied requests are not counted.
    async fn try_consume(
        &self,
        key: &RateLimitKey,
        policy: RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError>;
}

/// Key identifying a rate-limited client on one path.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub client_ip: String,
    pub path: String,
}

impl RateLimitKey {
    pub fn new(client_ip: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            path: path.into(),
        }
    }

    /// Table key, `"{ip}:{path}"`.
    pub fn as_key(&self) -> String {
        format!("{}:{}", self.client_ip, self.path)
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client_ip, self.path)
    }
}

/// Fixed-window quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub fn per_window_secs(max_requests: u32, window_secs: u64) -> Self {
        Self::new(max_requests, Duration::from_secs(window_secs))
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        /// Time until the window resets.
        reset_after: Duration,
    },
    Denied {
        limit: u32,
        /// Time until a request will be admitted again.
        retry_after: Duration,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }

    pub fn limit(&self) -> u32 {
        match self {
            RateLimitDecision::Allowed { limit, .. } | RateLimitDecision::Denied { limit, .. } => {
                *limit
            }
        }
    }
}

/// Errors from rate limit operations.
#[derive(Debug, Clone, Error)]
pub enum RateLimitError {
    #[error("Rate limiter unavailable: {0}")]
    Unavailable(String),
}

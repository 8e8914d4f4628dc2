//! In-memory rate limiter for single-process deployments.
//!
//! Fixed-window counter keyed by `"{ip}:{path}"`. Expired entries are swept
//! lazily on every call; there is no background task. Counts are lost on
//! restart and are not shared between instances.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::ports::{RateLimitDecision, RateLimitError, RateLimitKey, RateLimitPolicy, RateLimiter};

/// In-memory fixed-window rate limiter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateLimiter {
    /// Per-key window state.
    windows: Arc<RwLock<HashMap<String, WindowState>>>,
}

/// State for a single rate limit window.
#[derive(Debug, Clone, Copy)]
struct WindowState {
    /// Requests admitted in the current window.
    count: u32,
    /// When the current window ends.
    reset_at: Instant,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub async fn tracked_keys(&self) -> usize {
        let now = Instant::now();
        self.windows
            .read()
            .await
            .values()
            .filter(|state| state.reset_at > now)
            .count()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn try_consume(
        &self,
        key: &RateLimitKey,
        policy: RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        // Lazy sweep of expired windows
        windows.retain(|_, state| state.reset_at > now);

        match windows.get_mut(&key.as_key()) {
            None => {
                let reset_at = now + policy.window;
                windows.insert(key.as_key(), WindowState { count: 1, reset_at });
                Ok(RateLimitDecision::Allowed {
                    limit: policy.max_requests,
                    remaining: policy.max_requests.saturating_sub(1),
                    reset_after: policy.window,
                })
            }
            Some(state) if state.count >= policy.max_requests => Ok(RateLimitDecision::Denied {
                limit: policy.max_requests,
                retry_after: state.reset_at.saturating_duration_since(now),
            }),
            Some(state) => {
                state.count += 1;
                Ok(RateLimitDecision::Allowed {
                    limit: policy.max_requests,
                    remaining: policy.max_requests.saturating_sub(state.count),
                    reset_after: state.reset_at.saturating_duration_since(now),
                })
            }
        }
    }
}

//! Request limit configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Rate limit windows and body size caps for the payment routes
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Fixed rate limit window, in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Checkout requests allowed per client per window
    #[serde(default = "default_checkout_max_requests")]
    pub checkout_max_requests: u32,

    /// Payment-intent requests allowed per client per window
    #[serde(default = "default_payment_intent_max_requests")]
    pub payment_intent_max_requests: u32,

    /// Largest accepted checkout body
    #[serde(default = "default_checkout_max_body_bytes")]
    pub checkout_max_body_bytes: usize,

    /// Largest accepted webhook body
    #[serde(default = "default_webhook_max_body_bytes")]
    pub webhook_max_body_bytes: usize,
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_secs == 0 {
            return Err(ValidationError::InvalidLimit("window_secs"));
        }
        if self.checkout_max_requests == 0 {
            return Err(ValidationError::InvalidLimit("checkout_max_requests"));
        }
        if self.payment_intent_max_requests == 0 {
            return Err(ValidationError::InvalidLimit("payment_intent_max_requests"));
        }
        if self.checkout_max_body_bytes == 0 {
            return Err(ValidationError::InvalidLimit("checkout_max_body_bytes"));
        }
        if self.webhook_max_body_bytes == 0 {
            return Err(ValidationError::InvalidLimit("webhook_max_body_bytes"));
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            checkout_max_requests: default_checkout_max_requests(),
            payment_intent_max_requests: default_payment_intent_max_requests(),
            checkout_max_body_bytes: default_checkout_max_body_bytes(),
            webhook_max_body_bytes: default_webhook_max_body_bytes(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_checkout_max_requests() -> u32 {
    10
}

fn default_payment_intent_max_requests() -> u32 {
    5
}

fn default_checkout_max_body_bytes() -> usize {
    10 * 1024
}

fn default_webhook_max_body_bytes() -> usize {
    1024 * 1024
}

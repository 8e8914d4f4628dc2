//! Payment configuration

use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::SecretString;
use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;

static SECRET_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^sk_(test|live)_[A-Za-z0-9_-]{8,}$").expect("secret key pattern compiles")
});

static PUBLISHABLE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^pk_(test|live)_[A-Za-z0-9_-]{8,}$").expect("publishable key pattern compiles")
});

static WEBHOOK_SECRET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^whsec_.+$").expect("webhook secret pattern compiles"));

/// Payment configuration (Stripe)
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    #[serde(default)]
    pub stripe_secret_key: String,

    /// Stripe publishable key (exposed to clients)
    #[serde(default)]
    pub stripe_publishable_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,

    /// Stripe API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout for Stripe calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries on connect/timeout failures
    #[serde(default = "default_max_network_retries")]
    pub max_network_retries: u32,

    /// Maximum age of a signed webhook timestamp, in seconds
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_secret_key.starts_with("sk_test_")
            || self.stripe_publishable_key.starts_with("pk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_secret_key.starts_with("sk_live_")
    }

    pub fn secret_key(&self) -> SecretString {
        SecretString::new(self.stripe_secret_key.clone())
    }

    /// The webhook secret, unless missing or a placeholder.
    pub fn webhook_secret(&self) -> Option<SecretString> {
        self.configured_webhook_secret()
            .map(|secret| SecretString::new(secret.to_string()))
    }

    pub fn has_webhook_secret(&self) -> bool {
        self.configured_webhook_secret().is_some()
    }

    fn configured_webhook_secret(&self) -> Option<&str> {
        self.stripe_webhook_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !is_placeholder_secret(secret))
    }

    /// Validate payment configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.stripe_secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_SECRET_KEY"));
        }
        if self.stripe_publishable_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_PUBLISHABLE_KEY"));
        }
        if !SECRET_KEY_PATTERN.is_match(&self.stripe_secret_key) {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !PUBLISHABLE_KEY_PATTERN.is_match(&self.stripe_publishable_key) {
            return Err(ValidationError::InvalidStripePublishableKey);
        }

        match self.configured_webhook_secret() {
            Some(secret) if !WEBHOOK_SECRET_PATTERN.is_match(secret) => {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
            None if production => {
                return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
            }
            _ => {}
        }

        if production && self.is_test_mode() {
            return Err(ValidationError::TestKeysInProduction);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.webhook_tolerance_secs <= 0 {
            return Err(ValidationError::InvalidLimit("webhook_tolerance_secs"));
        }

        Ok(())
    }
}

/// Empty, `whsec_` alone, or copied from a template.
fn is_placeholder_secret(secret: &str) -> bool {
    let lower = secret.to_ascii_lowercase();
    secret.is_empty() || secret == "whsec_" || lower.contains("your") || lower.contains("placeholder")
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: String::new(),
            stripe_publishable_key: String::new(),
            stripe_webhook_secret: None,
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            max_network_retries: default_max_network_retries(),
            webhook_tolerance_secs: default_webhook_tolerance(),
        }
    }
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("stripe_secret_key", &"[REDACTED]")
            .field("stripe_publishable_key", &self.stripe_publishable_key)
            .field(
                "stripe_webhook_secret",
                &self.stripe_webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_network_retries", &self.max_network_retries)
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_network_retries() -> u32 {
    3
}

fn default_webhook_tolerance() -> i64 {
    300
}

//! Security-relevant occurrences recorded by guards, validators and the webhook path.

use serde::Serialize;
use std::fmt;

use super::Timestamp;

/// Category of a recorded security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventKind {
    RateLimitExceeded,
    InvalidOrigin,
    RequestTooLarge,
    InvalidItems,
    InvalidUrls,
    InvalidEmail,
    InvalidItemName,
    InvalidAmount,
    UnsupportedCurrency,
    InvalidQuantity,
    InvalidDescription,
    WebhookPayloadTooLarge,
    WebhookMissingSignature,
    WebhookSuspiciousUserAgent,
    WebhookVerified,
    WebhookVerificationFailed,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            SecurityEventKind::InvalidOrigin => "INVALID_ORIGIN",
            SecurityEventKind::RequestTooLarge => "REQUEST_TOO_LARGE",
            SecurityEventKind::InvalidItems => "INVALID_ITEMS",
            SecurityEventKind::InvalidUrls => "INVALID_URLS",
            SecurityEventKind::InvalidEmail => "INVALID_EMAIL",
            SecurityEventKind::InvalidItemName => "INVALID_ITEM_NAME",
            SecurityEventKind::InvalidAmount => "INVALID_AMOUNT",
            SecurityEventKind::UnsupportedCurrency => "UNSUPPORTED_CURRENCY",
            SecurityEventKind::InvalidQuantity => "INVALID_QUANTITY",
            SecurityEventKind::InvalidDescription => "INVALID_DESCRIPTION",
            SecurityEventKind::WebhookPayloadTooLarge => "WEBHOOK_PAYLOAD_TOO_LARGE",
            SecurityEventKind::WebhookMissingSignature => "WEBHOOK_MISSING_SIGNATURE",
            SecurityEventKind::WebhookSuspiciousUserAgent => "WEBHOOK_SUSPICIOUS_USER_AGENT",
            SecurityEventKind::WebhookVerified => "WEBHOOK_VERIFIED",
            SecurityEventKind::WebhookVerificationFailed => "WEBHOOK_VERIFICATION_FAILED",
        }
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single security event.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,
    /// Client address the request was attributed to.
    pub client: String,
    /// Free-form structured context (path, offending value, limits).
    pub details: serde_json::Value,
    pub occurred_at: Timestamp,
}

impl SecurityEvent {
    pub fn new(kind: SecurityEventKind, client: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            kind,
            client: client.into(),
            details,
            occurred_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&SecurityEventKind::WebhookSuspiciousUserAgent).unwrap();
        assert_eq!(json, "\"WEBHOOK_SUSPICIOUS_USER_AGENT\"");
        assert_eq!(
            SecurityEventKind::WebhookSuspiciousUserAgent.as_str(),
            "WEBHOOK_SUSPICIOUS_USER_AGENT"
        );
    }

    #[test]
    fn event_carries_client_and_details() {
        let event = SecurityEvent::new(
            SecurityEventKind::InvalidOrigin,
            "203.0.113.9",
            serde_json::json!({ "origin": "https://evil.example" }),
        );
        assert_eq!(event.client, "203.0.113.9");
        assert_eq!(event.details["origin"], "https://evil.example");
    }
}

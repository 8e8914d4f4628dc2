//! Webhook error types.
//!
//! Every verification failure collapses to `signature_invalid` at the HTTP
//! boundary; the variants exist so logs can tell the causes apart.

use http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::GatewayError;

/// Errors raised while verifying or handling a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// No shared secret configured.
    #[error("Webhook secret is not configured")]
    MissingSecret,

    /// Empty request body.
    #[error("Missing payload")]
    MissingPayload,

    /// Empty signature header.
    #[error("Missing signature")]
    MissingSignature,

    /// Body larger than the verifier accepts.
    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Signature header is not `t=<ts>,v1=<hex>...`.
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),

    /// No v1 signature matched the expected HMAC.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signed timestamp older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signed timestamp further in the future than the allowed clock skew.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Authentic body that is not a well-formed event.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A registered handler failed while processing an event.
    #[error("Handler failed: {0}")]
    HandlerFailed(String),
}

impl WebhookError {
    /// True for failures of the verification step, as opposed to handling.
    pub fn is_verification_failure(&self) -> bool {
        !matches!(self, WebhookError::HandlerFailed(_))
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Status codes determine the provider's retry behavior:
    /// - 4xx: no retry
    /// - 5xx: retried later
    pub fn status_code(&self) -> StatusCode {
        if self.is_verification_failure() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<WebhookError> for GatewayError {
    fn from(err: WebhookError) -> Self {
        if err.is_verification_failure() {
            GatewayError::signature_invalid(err.to_string())
        } else {
            GatewayError::unexpected("Webhook handler failed", err.to_string())
        }
    }
}

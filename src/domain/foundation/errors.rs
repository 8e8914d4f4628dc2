//! Error types shared by every gateway operation.
//!
//! `GatewayError` is the single rejection taxonomy surfaced to callers. Each
//! variant knows its wire `kind`, its HTTP status and whether a client may
//! retry the same request later.

use http::StatusCode;
use thiserror::Error;

/// Rejection surfaced by a gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Client-correctable input problem on a named field.
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Fixed-window quota exhausted for this client and path.
    #[error("Too many requests. Please wait before trying again.")]
    RateLimited { limit: u32, retry_after_secs: u64 },

    /// Origin/Referer did not match the allow-list.
    #[error("Invalid request origin")]
    OriginRejected,

    /// Declared or actual body size above the route's limit.
    #[error("{message}")]
    PayloadTooLarge { limit: usize, message: String },

    /// Webhook authentication failed. `reason` is for logs only.
    #[error("Invalid webhook signature")]
    SignatureInvalid { reason: String },

    /// Upstream payment provider failure.
    #[error("{context}")]
    Provider {
        context: String,
        details: String,
        provider_type: Option<String>,
        provider_code: Option<String>,
    },

    /// Anything else, caught at the request boundary.
    #[error("{context}")]
    Unexpected { context: String, cause: String },
}

impl GatewayError {
    /// Creates a validation error for a field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a payload-too-large error.
    pub fn payload_too_large(limit: usize, message: impl Into<String>) -> Self {
        GatewayError::PayloadTooLarge {
            limit,
            message: message.into(),
        }
    }

    /// Creates a signature failure with a diagnostic reason.
    pub fn signature_invalid(reason: impl Into<String>) -> Self {
        GatewayError::SignatureInvalid {
            reason: reason.into(),
        }
    }

    /// Creates an unexpected error with a public context message.
    pub fn unexpected(context: impl Into<String>, cause: impl Into<String>) -> Self {
        GatewayError::Unexpected {
            context: context.into(),
            cause: cause.into(),
        }
    }

    /// Stable machine-readable kind, used as the `code` of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation { .. } => "validation_error",
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::OriginRejected => "origin_rejected",
            GatewayError::PayloadTooLarge { .. } => "payload_too_large",
            GatewayError::SignatureInvalid { .. } => "signature_invalid",
            GatewayError::Provider { .. } => "provider_error",
            GatewayError::Unexpected { .. } => "unexpected_error",
        }
    }

    /// Maps the error to its HTTP status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::OriginRejected => StatusCode::FORBIDDEN,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::SignatureInvalid { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::Provider { .. } | GatewayError::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns true if resubmitting the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::RateLimited { .. }
                | GatewayError::Provider { .. }
                | GatewayError::Unexpected { .. }
        )
    }

    /// Name of the failing field for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            GatewayError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

//! HTTP error responses.
//!
//! Every rejection leaves the gateway as `{error, code, field?, details?, type?}`
//! with the status from [`GatewayError::status_code`].

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::GatewayError;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Human-readable message, safe to show to users.
    pub error: String,
    /// Machine-readable code.
    pub code: String,
    /// Request field a validation failure refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            field: None,
            details: None,
            error_type: None,
        }
    }
}

impl From<&GatewayError> for ErrorResponse {
    fn from(err: &GatewayError) -> Self {
        match err {
            // Provider diagnostics are relayed; the code is the provider's own when known.
            GatewayError::Provider {
                context,
                details,
                provider_type,
                provider_code,
            } => Self {
                error: context.clone(),
                code: provider_code
                    .clone()
                    .unwrap_or_else(|| err.kind().to_string()),
                field: None,
                details: Some(details.clone()),
                error_type: provider_type.clone(),
            },
            _ => Self {
                field: err.field().map(str::to_string),
                ..Self::new(err.kind(), err.to_string())
            },
        }
    }
}

/// API error type that converts gateway errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();

        match &self.0 {
            GatewayError::Unexpected { context, cause } => {
                tracing::error!(context = %context, cause = %cause, "Unexpected error");
            }
            GatewayError::Provider { details, .. } => {
                tracing::error!(details = %details, "Payment provider error");
            }
            _ => {}
        }

        let mut response = (status, Json(ErrorResponse::from(&self.0))).into_response();

        if let GatewayError::RateLimited {
            retry_after_secs, ..
        } = self.0
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

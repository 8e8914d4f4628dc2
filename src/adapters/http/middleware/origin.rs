//! Origin validation middleware (CSRF defense for payment endpoints).
//!
//! The request's `Origin` header, or failing that the origin of its
//! `Referer`, must exactly match one of the allowed origins.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::adapters::http::error::ApiError;
use crate::domain::foundation::{GatewayError, SecurityEvent, SecurityEventKind};
use crate::domain::payment::origin_of_str;
use crate::ports::SecurityEventSink;

use super::client_ip::ClientIp;

/// Origin allow-list state.
#[derive(Clone)]
pub struct OriginGuard {
    allowed_origins: Arc<Vec<String>>,
    security_sink: Arc<dyn SecurityEventSink>,
    /// Off outside production.
    enforce: bool,
}

impl OriginGuard {
    pub fn new(
        allowed_origins: Vec<String>,
        security_sink: Arc<dyn SecurityEventSink>,
        enforce: bool,
    ) -> Self {
        Self {
            allowed_origins: Arc::new(allowed_origins),
            security_sink,
            enforce,
        }
    }

    pub fn is_allowed(&self, headers: &HeaderMap) -> bool {
        request_origin(headers)
            .map(|origin| self.allowed_origins.iter().any(|allowed| *allowed == origin))
            .unwrap_or(false)
    }
}

/// Origin of the page that issued the request.
///
/// The `Origin` header verbatim, else the origin of a parseable `Referer`.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.is_empty());
    if let Some(origin) = origin {
        return Some(origin.to_string());
    }

    headers
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok())
        .and_then(origin_of_str)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Rejects the request with 403 unless its origin is allowed.
pub async fn origin_middleware(
    State(guard): State<OriginGuard>,
    ClientIp(client_ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    if !guard.enforce || guard.is_allowed(request.headers()) {
        return next.run(request).await;
    }

    let headers = request.headers();
    guard.security_sink.record(SecurityEvent::new(
        SecurityEventKind::InvalidOrigin,
        client_ip,
        serde_json::json!({
            "origin": header_str(headers, header::ORIGIN),
            "referer": header_str(headers, header::REFERER),
        }),
    ));

    ApiError(GatewayError::OriginRejected).into_response()
}

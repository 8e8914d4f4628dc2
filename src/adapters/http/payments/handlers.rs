//! HTTP handlers for the payment endpoints.
//!
//! These handlers connect axum routes to the application layer. Rate limit
//! and origin checks run as route middleware before any handler here; size
//! checks, parsing and validation happen in the handler, in that order.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use serde::de::DeserializeOwned;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{request_origin, ClientIp};
use crate::application::handlers::payment::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreatePaymentIntentCommand,
    CreatePaymentIntentHandler,
};
use crate::application::handlers::webhook::{ProcessWebhookCommand, ProcessWebhookHandler};
use crate::config::AppConfig;
use crate::domain::foundation::{GatewayError, SecurityEvent, SecurityEventKind};
use crate::domain::payment::{sanitize, CheckoutDraft, InputError, PaymentIntentDraft};
use crate::domain::webhook::WebhookError;
use crate::ports::{PaymentProvider, RateLimiter, SecurityEventSink};

use super::dto::{HealthResponse, WebhookAck};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

const CHECKOUT_TOO_LARGE_MESSAGE: &str = "Request payload too large";
const WEBHOOK_TOO_LARGE_MESSAGE: &str = "Payload too large";
const MISSING_SIGNATURE_MESSAGE: &str = "Missing stripe-signature header";
const WEBHOOK_FAILED_MESSAGE: &str = "Webhook handler failed";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Limits and origin policy for the payment routes.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Rate limit and origin guards are active (production).
    pub enforce_guards: bool,
    pub allowed_origins: Vec<String>,
    /// Fallback origin for redirect URL checks when the request carries none.
    pub app_origin: Option<String>,
    pub rate_window: Duration,
    pub checkout_max_requests: u32,
    pub payment_intent_max_requests: u32,
    pub checkout_max_body_bytes: usize,
    pub webhook_max_body_bytes: usize,
}

impl GatewaySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enforce_guards: config.is_production(),
            allowed_origins: config.server.allowed_origins(),
            app_origin: config.server.app_origin(),
            rate_window: Duration::from_secs(config.limits.window_secs),
            checkout_max_requests: config.limits.checkout_max_requests,
            payment_intent_max_requests: config.limits.payment_intent_max_requests,
            checkout_max_body_bytes: config.limits.checkout_max_body_bytes,
            webhook_max_body_bytes: config.limits.webhook_max_body_bytes,
        }
    }
}

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub security_sink: Arc<dyn SecurityEventSink>,
    pub webhook_handler: Arc<ProcessWebhookHandler>,
    pub settings: GatewaySettings,
}

impl PaymentsAppState {
    /// Create handlers on demand from the shared state.
    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(self.payment_provider.clone())
    }

    pub fn payment_intent_handler(&self) -> CreatePaymentIntentHandler {
        CreatePaymentIntentHandler::new(self.payment_provider.clone())
    }

    fn record(&self, kind: SecurityEventKind, client_ip: &str, details: serde_json::Value) {
        self.security_sink
            .record(SecurityEvent::new(kind, client_ip, details));
    }

    /// Records the rejection's security event, if it has one.
    fn reject_input(&self, client_ip: &str, err: InputError) -> ApiError {
        if let Some(kind) = err.security_event() {
            self.record(kind, client_ip, serde_json::json!({ "field": err.field() }));
        }
        ApiError(err.into())
    }

    /// Origin redirect URLs must share.
    fn expected_origin(&self, headers: &HeaderMap) -> String {
        request_origin(headers)
            .or_else(|| self.settings.app_origin.clone())
            .unwrap_or_default()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request helpers
// ════════════════════════════════════════════════════════════════════════════════

/// True when either the declared or the actual body length is over `limit`.
fn exceeds_limit(headers: &HeaderMap, body_len: usize, limit: usize) -> bool {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    declared.is_some_and(|len| len > limit) || body_len > limit
}

/// Parses JSON, sanitizes every string in it, then deserializes the draft.
fn parse_draft<T: DeserializeOwned>(body: &[u8]) -> Result<T, InputError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| InputError::MalformedBody(e.to_string()))?;
    serde_json::from_value(sanitize(value)).map_err(|e| InputError::MalformedBody(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /checkout - Create a hosted checkout session
pub async fn create_checkout(
    State(state): State<PaymentsAppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let limit = state.settings.checkout_max_body_bytes;
    if exceeds_limit(&headers, body.len(), limit) {
        state.record(
            SecurityEventKind::RequestTooLarge,
            &client_ip,
            serde_json::json!({ "size": body.len(), "limit": limit }),
        );
        return Err(GatewayError::payload_too_large(limit, CHECKOUT_TOO_LARGE_MESSAGE).into());
    }

    let request = parse_draft::<CheckoutDraft>(&body)
        .and_then(|draft| draft.validate(&state.expected_origin(&headers)))
        .map_err(|e| state.reject_input(&client_ip, e))?;

    let created = state
        .checkout_handler()
        .handle(CreateCheckoutSessionCommand { request })
        .await?;

    tracing::info!(session_id = %created.session_id, "Checkout session created");
    Ok(Json(created))
}

/// POST /payment-intent - Create a payment intent for client-side confirmation
pub async fn create_payment_intent(
    State(state): State<PaymentsAppState>,
    ClientIp(client_ip): ClientIp,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request = parse_draft::<PaymentIntentDraft>(&body)
        .and_then(PaymentIntentDraft::validate)
        .map_err(|e| state.reject_input(&client_ip, e))?;

    let result = state
        .payment_intent_handler()
        .handle(CreatePaymentIntentCommand { request })
        .await?;

    tracing::info!(payment_intent_id = %result.payment_intent_id, "Payment intent created");
    Ok(Json(result))
}

/// POST /webhook - Receive a signed provider event
///
/// Always acknowledges verified deliveries, even when the event's handler
/// fails, so the provider does not retry on business-logic errors.
pub async fn handle_webhook(
    State(state): State<PaymentsAppState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let limit = state.settings.webhook_max_body_bytes;
    if exceeds_limit(&headers, body.len(), limit) {
        state.record(
            SecurityEventKind::WebhookPayloadTooLarge,
            &client_ip,
            serde_json::json!({ "size": body.len(), "limit": limit }),
        );
        return Err(GatewayError::payload_too_large(limit, WEBHOOK_TOO_LARGE_MESSAGE).into());
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let Some(signature) = signature else {
        state.record(
            SecurityEventKind::WebhookMissingSignature,
            &client_ip,
            serde_json::Value::Null,
        );
        return Err(GatewayError::validation(SIGNATURE_HEADER, MISSING_SIGNATURE_MESSAGE).into());
    };

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    if !user_agent.contains("Stripe") {
        state.record(
            SecurityEventKind::WebhookSuspiciousUserAgent,
            &client_ip,
            serde_json::json!({ "user_agent": user_agent }),
        );
    }

    let payload = String::from_utf8(body.to_vec())
        .map_err(|_| WebhookError::MalformedHeader("body is not valid UTF-8".to_string()));

    let result = match payload {
        Ok(payload) => {
            state
                .webhook_handler
                .handle(ProcessWebhookCommand { payload, signature })
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(processed) => {
            state.record(
                SecurityEventKind::WebhookVerified,
                &client_ip,
                serde_json::json!({
                    "event_id": processed.event_id,
                    "event_type": processed.event_type.as_str(),
                }),
            );
            Ok(Json(WebhookAck::received()))
        }
        Err(e) if e.is_verification_failure() => {
            state.record(
                SecurityEventKind::WebhookVerificationFailed,
                &client_ip,
                serde_json::json!({ "reason": e.to_string() }),
            );
            Err(GatewayError::from(e).into())
        }
        Err(e) => Err(GatewayError::unexpected(WEBHOOK_FAILED_MESSAGE, e.to_string()).into()),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

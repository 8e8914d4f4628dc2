//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use payment_gateway::adapters::http::{app_router, GatewaySettings, PaymentsAppState};
use payment_gateway::adapters::rate_limiter::InMemoryRateLimiter;
use payment_gateway::adapters::security::InMemorySecurityEventSink;
use payment_gateway::adapters::stripe::MockPaymentProvider;
use payment_gateway::application::handlers::webhook::ProcessWebhookHandler;
use payment_gateway::domain::webhook::{
    EventDispatcher, EventType, WebhookError, WebhookEvent, WebhookEventHandler, WebhookVerifier,
};

pub const APP_ORIGIN: &str = "https://app.example";
pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const CLIENT_IP: &str = "203.0.113.9";

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Counts the events it receives.
#[derive(Default)]
pub struct RecordingHandler {
    calls: AtomicU32,
}

impl RecordingHandler {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookEventHandler for RecordingHandler {
    async fn handle(&self, _event: &WebhookEvent) -> Result<(), WebhookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Router plus handles on every fake it was built with.
pub struct TestApp {
    pub router: Router,
    pub provider: MockPaymentProvider,
    pub sink: InMemorySecurityEventSink,
    pub recorder: Arc<RecordingHandler>,
}

pub fn settings(enforce_guards: bool) -> GatewaySettings {
    GatewaySettings {
        enforce_guards,
        allowed_origins: vec![APP_ORIGIN.to_string()],
        app_origin: Some(APP_ORIGIN.to_string()),
        rate_window: Duration::from_secs(60),
        checkout_max_requests: 10,
        payment_intent_max_requests: 5,
        checkout_max_body_bytes: 10 * 1024,
        webhook_max_body_bytes: 1024 * 1024,
    }
}

pub fn test_app(settings: GatewaySettings) -> TestApp {
    let provider = MockPaymentProvider::new();
    let sink = InMemorySecurityEventSink::new();
    let recorder = Arc::new(RecordingHandler::default());

    let dispatcher = EventDispatcher::new()
        .register(EventType::CheckoutSessionCompleted, recorder.clone())
        .register(EventType::PaymentIntentSucceeded, recorder.clone());
    let webhook_handler = Arc::new(ProcessWebhookHandler::new(
        WebhookVerifier::new(WEBHOOK_SECRET),
        dispatcher,
    ));

    let state = PaymentsAppState {
        payment_provider: Arc::new(provider.clone()),
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        security_sink: Arc::new(sink.clone()),
        webhook_handler,
        settings,
    };

    TestApp {
        router: app_router(state, Duration::from_secs(30)),
        provider,
        sink,
        recorder,
    }
}

/// JSON POST from the app's own origin.
pub fn json_post(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .header("origin", APP_ORIGIN)
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

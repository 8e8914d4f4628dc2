//! Axum router configuration for the payment endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{
    origin_middleware, rate_limit_middleware, OriginGuard, RateLimitGuard,
};
use crate::ports::RateLimitPolicy;

use super::handlers::{
    create_checkout, create_payment_intent, handle_webhook, health, PaymentsAppState,
};

/// Create the payment API router.
///
/// # Routes
///
/// ## Browser Endpoints (rate limited, origin checked)
/// - `POST /checkout` - Create a hosted checkout session
/// - `POST /payment-intent` - Create a payment intent
///
/// ## Webhook Endpoints (signature verified)
/// - `POST /webhook` - Handle Stripe webhooks
///
/// ## Probes
/// - `GET /health` - Liveness
///
/// Route layers run outermost-last, so the rate limit is applied before the
/// origin check.
pub fn payment_routes(state: &PaymentsAppState) -> Router<PaymentsAppState> {
    let settings = &state.settings;
    let origin_guard = OriginGuard::new(
        settings.allowed_origins.clone(),
        state.security_sink.clone(),
        settings.enforce_guards,
    );
    let rate_guard = |max_requests| {
        RateLimitGuard::new(
            state.rate_limiter.clone(),
            state.security_sink.clone(),
            RateLimitPolicy::new(max_requests, settings.rate_window),
            settings.enforce_guards,
        )
    };

    Router::new()
        .route(
            "/checkout",
            post(create_checkout)
                .layer(middleware::from_fn_with_state(
                    origin_guard.clone(),
                    origin_middleware,
                ))
                .layer(middleware::from_fn_with_state(
                    rate_guard(settings.checkout_max_requests),
                    rate_limit_middleware,
                )),
        )
        .route(
            "/payment-intent",
            post(create_payment_intent)
                .layer(middleware::from_fn_with_state(origin_guard, origin_middleware))
                .layer(middleware::from_fn_with_state(
                    rate_guard(settings.payment_intent_max_requests),
                    rate_limit_middleware,
                )),
        )
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health))
}

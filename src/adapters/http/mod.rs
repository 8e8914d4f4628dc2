//! HTTP adapters - REST API implementations.
//!
//! The payment endpoints live in [`payments`]; cross-cutting guards live in
//! [`middleware`]. [`app_router`] assembles the full service.

pub mod error;
pub mod middleware;
pub mod payments;

use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use error::{ApiError, ErrorResponse};
pub use payments::{payment_routes, GatewaySettings, PaymentsAppState};

/// Build the complete application router.
///
/// Every route gets request tracing, CORS for the allowed origins and a
/// request timeout.
pub fn app_router(state: PaymentsAppState, request_timeout: Duration) -> Router {
    let cors = build_cors_layer(&state.settings.allowed_origins);

    payment_routes(&state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

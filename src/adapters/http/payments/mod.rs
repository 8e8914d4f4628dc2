//! HTTP adapter for the payment endpoints.
//!
//! - `POST /checkout` - Create a hosted checkout session
//! - `POST /payment-intent` - Create a payment intent
//! - `POST /webhook` - Handle Stripe webhooks
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{HealthResponse, WebhookAck};
pub use handlers::{GatewaySettings, PaymentsAppState, SIGNATURE_HEADER};
pub use routes::payment_routes;

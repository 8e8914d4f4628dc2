//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - customer lookup/creation, checkout sessions, payment intents
//! - `RateLimiter` - fixed-window request quotas keyed by client and path
//! - `SecurityEventSink` - structured log of security-relevant rejections

mod payment_provider;
mod rate_limiter;
mod security_event_sink;

pub use payment_provider::{
    CheckoutSession, CreateCheckoutSessionRequest, CreateCustomerRequest,
    CreatePaymentIntentRequest, CustomerIdentity, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, SessionLineItem,
};
pub use rate_limiter::{
    RateLimitDecision, RateLimitError, RateLimitKey, RateLimitPolicy, RateLimiter,
};
pub use security_event_sink::SecurityEventSink;

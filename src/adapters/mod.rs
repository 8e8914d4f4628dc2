//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe REST client and an in-memory mock provider
//! - `rate_limiter` - In-memory fixed-window rate limiter
//! - `security` - Security event sinks (tracing, in-memory)
//! - `http` - Axum routes, guards and error responses

pub mod http;
pub mod rate_limiter;
pub mod security;
pub mod stripe;

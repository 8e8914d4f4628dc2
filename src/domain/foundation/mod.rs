//! Foundation module - Shared domain primitives.
//!
//! Contains the timestamp value object, the gateway error taxonomy and the
//! security event vocabulary used across the payment gateway.

mod errors;
mod security_event;
mod timestamp;

pub use errors::GatewayError;
pub use security_event::{SecurityEvent, SecurityEventKind};
pub use timestamp::Timestamp;

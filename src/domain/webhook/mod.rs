//! Webhook module - verification and dispatch of provider callbacks.

mod dispatcher;
mod errors;
mod event;
mod verifier;

pub use dispatcher::{DispatchOutcome, EventDispatcher, WebhookEventHandler};
pub use errors::WebhookError;
pub use event::{EventType, WebhookEvent};
pub use verifier::{
    sign_payload, signature_header, verify, SignatureHeader, WebhookVerifier,
    DEFAULT_TOLERANCE_SECS, MAX_CLOCK_SKEW_SECS, MAX_PAYLOAD_BYTES,
};

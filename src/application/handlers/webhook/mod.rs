//! Webhook handlers.
//!
//! - `ProcessWebhookHandler` - verify, then dispatch
//! - `LoggingEventHandler` / `default_event_dispatcher` - baseline reactions

mod logging_handler;
mod process_webhook;

pub use logging_handler::{default_event_dispatcher, LoggingEventHandler};
pub use process_webhook::{ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult};

//! Event dispatcher - routes verified events to handlers by type.
//!
//! The dispatcher never fails. A missing handler is a no-op, and a handler
//! error or panic is logged and reported as [`DispatchOutcome::Failed`] so
//! the delivery is still acknowledged.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use super::errors::WebhookError;
use super::event::{EventType, WebhookEvent};

/// Handler for one or more webhook event types.
///
/// Deliveries are at-least-once and unordered, so implementations must be
/// idempotent per event id.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> Result<(), WebhookError>;
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran and succeeded.
    Handled,
    /// No handler is registered for the event type.
    Ignored,
    /// The handler failed; the message is for logs.
    Failed(String),
}

/// Dispatch table from event type to handler.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: HashMap<EventType, Arc<dyn WebhookEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event_type`, replacing any previous one.
    pub fn register(mut self, event_type: EventType, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.handlers.insert(event_type, handler);
        self
    }

    /// Registers one handler for several event types.
    pub fn register_all(
        mut self,
        event_types: impl IntoIterator<Item = EventType>,
        handler: Arc<dyn WebhookEventHandler>,
    ) -> Self {
        for event_type in event_types {
            self.handlers.insert(event_type, handler.clone());
        }
        self
    }

    pub fn has_handler(&self, event_type: &EventType) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Routes the event to its handler, isolating any failure.
    pub async fn dispatch(&self, event: &WebhookEvent) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(&event.event_type) else {
            tracing::debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                "No handler registered, ignoring webhook event"
            );
            return DispatchOutcome::Ignored;
        };

        match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
            Ok(Ok(())) => DispatchOutcome::Handled,
            Ok(Err(e)) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Webhook handler failed"
                );
                DispatchOutcome::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    panic = %message,
                    "Webhook handler panicked"
                );
                DispatchOutcome::Failed(message)
            }
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.handlers.keys().map(EventType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("EventDispatcher").field("handlers", &types).finish()
    }
}

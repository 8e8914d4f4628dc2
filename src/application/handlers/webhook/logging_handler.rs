//! Default webhook handlers: structured logging per known event type.
//!
//! Business reactions (fulfilment, emails, entitlement changes) register
//! their own handlers over these.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::webhook::{EventDispatcher, EventType, WebhookError, WebhookEvent, WebhookEventHandler};

/// Logs each event with the fields relevant to its type. Idempotent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

fn field<'a>(event: &'a WebhookEvent, name: &str) -> Option<&'a str> {
    event.data_object.get(name).and_then(|v| v.as_str())
}

#[async_trait]
impl WebhookEventHandler for LoggingEventHandler {
    async fn handle(&self, event: &WebhookEvent) -> Result<(), WebhookError> {
        let object_id = event.object_id().unwrap_or("unknown");

        match &event.event_type {
            EventType::PaymentIntentSucceeded => {
                tracing::info!(event_id = %event.id, payment_intent_id = object_id, "Payment succeeded");
            }
            EventType::PaymentIntentPaymentFailed => {
                tracing::warn!(event_id = %event.id, payment_intent_id = object_id, "Payment failed");
            }
            EventType::CheckoutSessionCompleted => {
                let mode = field(event, "mode").unwrap_or("payment");
                tracing::info!(
                    event_id = %event.id,
                    session_id = object_id,
                    mode,
                    customer_id = field(event, "customer"),
                    "Checkout completed"
                );
            }
            EventType::CustomerCreated | EventType::CustomerUpdated => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    customer_id = object_id,
                    "Customer changed"
                );
            }
            EventType::CustomerSubscriptionCreated
            | EventType::CustomerSubscriptionUpdated
            | EventType::CustomerSubscriptionDeleted => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    subscription_id = object_id,
                    status = field(event, "status"),
                    "Subscription changed"
                );
            }
            EventType::InvoicePaymentSucceeded => {
                tracing::info!(event_id = %event.id, invoice_id = object_id, "Invoice payment succeeded");
            }
            EventType::InvoicePaymentFailed => {
                tracing::warn!(event_id = %event.id, invoice_id = object_id, "Invoice payment failed");
            }
            EventType::Unknown(raw) => {
                tracing::debug!(event_id = %event.id, event_type = %raw, "Unhandled event type");
            }
        }

        Ok(())
    }
}

/// Dispatcher with the logging handler registered for every known type.
pub fn default_event_dispatcher() -> EventDispatcher {
    EventDispatcher::new().register_all(EventType::known(), Arc::new(LoggingEventHandler))
}

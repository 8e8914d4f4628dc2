//! ProcessWebhookHandler - verifies a delivery and routes it to the dispatcher.

use crate::domain::webhook::{
    DispatchOutcome, EventDispatcher, EventType, WebhookError, WebhookVerifier,
};

/// A raw delivery as received over HTTP.
#[derive(Debug, Clone)]
pub struct ProcessWebhookCommand {
    pub payload: String,
    pub signature: String,
}

/// Result of processing a verified delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessWebhookResult {
    pub event_id: String,
    pub event_type: EventType,
    pub outcome: DispatchOutcome,
}

/// Handler for incoming provider webhooks.
///
/// Only verification fails the call. Handler failures are already isolated
/// by the dispatcher and surface as `DispatchOutcome::Failed`.
pub struct ProcessWebhookHandler {
    verifier: WebhookVerifier,
    dispatcher: EventDispatcher,
}

impl ProcessWebhookHandler {
    pub fn new(verifier: WebhookVerifier, dispatcher: EventDispatcher) -> Self {
        Self {
            verifier,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessWebhookCommand,
    ) -> Result<ProcessWebhookResult, WebhookError> {
        let event = self
            .verifier
            .verify(&cmd.payload, &cmd.signature)
            .map_err(|e| {
                if e == WebhookError::MissingSecret {
                    tracing::error!("Webhook secret not configured, rejecting delivery");
                } else {
                    tracing::warn!(error = %e, "Webhook verification failed");
                }
                e
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook verified"
        );

        let outcome = self.dispatcher.dispatch(&event).await;

        Ok(ProcessWebhookResult {
            event_id: event.id,
            event_type: event.event_type,
            outcome,
        })
    }
}

//! Verified webhook events and the event-type vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::WebhookError;

/// Event types the gateway knows about. Anything else is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    CheckoutSessionCompleted,
    PaymentIntentSucceeded,
    PaymentIntentPaymentFailed,
    InvoicePaymentSucceeded,
    InvoicePaymentFailed,
    CustomerSubscriptionCreated,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    CustomerCreated,
    CustomerUpdated,
    Unknown(String),
}

impl EventType {
    /// Every known (non-`Unknown`) event type.
    pub fn known() -> [EventType; 10] {
        [
            EventType::CheckoutSessionCompleted,
            EventType::PaymentIntentSucceeded,
            EventType::PaymentIntentPaymentFailed,
            EventType::InvoicePaymentSucceeded,
            EventType::InvoicePaymentFailed,
            EventType::CustomerSubscriptionCreated,
            EventType::CustomerSubscriptionUpdated,
            EventType::CustomerSubscriptionDeleted,
            EventType::CustomerCreated,
            EventType::CustomerUpdated,
        ]
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "checkout.session.completed" => EventType::CheckoutSessionCompleted,
            "payment_intent.succeeded" => EventType::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => EventType::PaymentIntentPaymentFailed,
            "invoice.payment_succeeded" => EventType::InvoicePaymentSucceeded,
            "invoice.payment_failed" => EventType::InvoicePaymentFailed,
            "customer.subscription.created" => EventType::CustomerSubscriptionCreated,
            "customer.subscription.updated" => EventType::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => EventType::CustomerSubscriptionDeleted,
            "customer.created" => EventType::CustomerCreated,
            "customer.updated" => EventType::CustomerUpdated,
            other => EventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::CheckoutSessionCompleted => "checkout.session.completed",
            EventType::PaymentIntentSucceeded => "payment_intent.succeeded",
            EventType::PaymentIntentPaymentFailed => "payment_intent.payment_failed",
            EventType::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            EventType::InvoicePaymentFailed => "invoice.payment_failed",
            EventType::CustomerSubscriptionCreated => "customer.subscription.created",
            EventType::CustomerSubscriptionUpdated => "customer.subscription.updated",
            EventType::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            EventType::CustomerCreated => "customer.created",
            EventType::CustomerUpdated => "customer.updated",
            EventType::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EventType::Unknown(_))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EventType::parse(&raw))
    }
}

/// An authenticated provider event.
///
/// The same `id` may be delivered more than once; handlers must tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEvent {
    pub id: String,
    pub event_type: EventType,
    /// Provider creation time, Unix seconds.
    pub created: Option<i64>,
    pub livemode: bool,
    /// The object the event is about (session, intent, invoice...).
    pub data_object: serde_json::Value,
    /// Signature header the delivery carried.
    pub received_signature: String,
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: EventType,
    created: Option<i64>,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

impl WebhookEvent {
    /// Parses an authenticated body into an event.
    pub fn from_payload(payload: &str, received_signature: &str) -> Result<Self, WebhookError> {
        let raw: RawEvent =
            serde_json::from_str(payload).map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if raw.id.is_empty() {
            return Err(WebhookError::ParseError("empty event id".to_string()));
        }

        Ok(Self {
            id: raw.id,
            event_type: raw.event_type,
            created: raw.created,
            livemode: raw.livemode,
            data_object: raw.data.object,
            received_signature: received_signature.to_string(),
        })
    }

    /// `id` field of the data object, if it has one.
    pub fn object_id(&self) -> Option<&str> {
        self.data_object.get("id").and_then(|v| v.as_str())
    }
}

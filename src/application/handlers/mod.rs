//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod payment;
pub mod webhook;

pub use payment::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CreatePaymentIntentCommand,
    CreatePaymentIntentHandler, CreatePaymentIntentResult, CustomerResolver,
    PaymentSessionParams, ResolveCustomerCommand, SessionBuilder, SessionCreated,
    SubscriptionSessionParams, CHECKOUT_FAILED_MESSAGE, PAYMENT_INTENT_FAILED_MESSAGE,
};
pub use webhook::{
    default_event_dispatcher, LoggingEventHandler, ProcessWebhookCommand, ProcessWebhookHandler,
    ProcessWebhookResult,
};

//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers receive already validated requests; guards and body parsing
//! live in the HTTP adapter.

pub mod handlers;

pub use handlers::{
    // Payment handlers
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, CreatePaymentIntentResult,
    CustomerResolver, ResolveCustomerCommand,
    PaymentSessionParams, SessionBuilder, SessionCreated, SubscriptionSessionParams,
    CHECKOUT_FAILED_MESSAGE, PAYMENT_INTENT_FAILED_MESSAGE,
    // Webhook handlers
    default_event_dispatcher, LoggingEventHandler,
    ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult,
};

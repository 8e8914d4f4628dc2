//! Payment handlers.
//!
//! ## Commands
//! - Creating hosted checkout sessions
//! - Creating payment intents
//!
//! ## Building blocks
//! - `CustomerResolver` - lookup-or-create by email
//! - `SessionBuilder` - one-time payment and subscription sessions

mod create_checkout_session;
mod create_payment_intent;
mod resolve_customer;
mod session_builder;

pub use create_checkout_session::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, CHECKOUT_FAILED_MESSAGE,
};
pub use create_payment_intent::{
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, CreatePaymentIntentResult,
    PAYMENT_INTENT_FAILED_MESSAGE,
};
pub use resolve_customer::{CustomerResolver, ResolveCustomerCommand};
pub use session_builder::{
    PaymentSessionParams, SessionBuilder, SessionCreated, SubscriptionSessionParams,
};

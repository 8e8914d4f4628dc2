//! Stripe payment adapter.
//!
//! - `StripePaymentAdapter` - form-encoded REST client for customers, checkout
//!   sessions and payment intents
//! - `MockPaymentProvider` - in-memory provider for tests and local runs

mod mock_payment_provider;
mod stripe_adapter;
mod stripe_types;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_API_BASE_URL};
pub use stripe_types::{
    StripeCheckoutSession, StripeCustomer, StripeErrorBody, StripeErrorDetail, StripeList,
    StripePaymentIntent,
};

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamp, error taxonomy, security events)
//! - `payment` - Input validator and checkout/payment-intent request models
//! - `webhook` - Signature verifier and event dispatcher

pub mod foundation;
pub mod payment;
pub mod webhook;

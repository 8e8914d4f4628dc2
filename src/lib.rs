//! Payment Gateway - Payment Session & Webhook Gateway
//!
//! This crate sits between a storefront and Stripe. It validates untrusted
//! checkout and payment-intent requests, resolves customers idempotently by
//! email, creates hosted checkout sessions and payment intents, and verifies
//! and dispatches signed webhook callbacks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

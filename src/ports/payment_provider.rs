//! Payment provider port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//! The customer resolver and session builder only ever talk to this trait,
//! so tests substitute an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::GatewayError;
use crate::domain::payment::{CheckoutMode, Currency, CustomerRef};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Find customers whose email matches exactly, newest first.
    ///
    /// Never mutates provider state.
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<CustomerIdentity>, PaymentError>;

    /// Create a customer record.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerIdentity, PaymentError>;

    /// Create a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Create a payment intent and return its client secret.
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;
}

/// Billing identity held by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    /// Provider-assigned opaque id.
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Request to create a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomerRequest {
    pub email: String,
    pub name: Option<String>,
    pub metadata: BTreeMap<String, String>,
    /// Provider-side idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// The priced line a session charges for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLineItem {
    /// Inline, dynamically priced product.
    PriceData {
        name: String,
        description: Option<String>,
        unit_amount: i64,
        currency: Currency,
        quantity: u32,
    },
    /// Pre-existing provider price.
    Price { price_id: String, quantity: u32 },
}

/// Request to create a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutSessionRequest {
    pub mode: CheckoutMode,
    pub line_item: SessionLineItem,
    pub customer: CustomerRef,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
    pub allow_promotion_codes: bool,
    /// Subscription mode only.
    pub trial_period_days: Option<u32>,
    /// Subscription mode only; always `true` for subscriptions.
    pub require_billing_address: bool,
}

/// Hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page the customer is redirected to.
    pub url: String,
    pub mode: CheckoutMode,
    pub customer_id: Option<String>,
}

/// Request to create a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentIntentRequest {
    pub amount: i64,
    pub currency: Currency,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: Currency,
}

/// Payment operation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    /// Error category.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider-specific error code (e.g. `resource_missing`).
    pub provider_code: Option<String>,

    /// Provider error type (e.g. `invalid_request_error`).
    pub provider_type: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            retryable: code.is_retryable(),
            code,
            message: message.into(),
            provider_code: None,
            provider_type: None,
        }
    }

    /// Add provider-specific error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Add provider error type.
    pub fn with_provider_type(mut self, error_type: impl Into<String>) -> Self {
        self.provider_type = Some(error_type.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    /// Create a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    /// Translate into the gateway taxonomy under a public `context` message.
    pub fn into_gateway_error(self, context: impl Into<String>) -> GatewayError {
        GatewayError::Provider {
            context: context.into(),
            details: self.message,
            provider_type: self.provider_type.or_else(|| Some(self.code.to_string())),
            provider_code: self.provider_code,
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network or connectivity issue.
    NetworkError,
    /// Invalid API key or authentication failure.
    AuthenticationError,
    /// Provider rejected the parameters.
    InvalidRequest,
    /// Card was declined.
    CardDeclined,
    /// Resource not found.
    NotFound,
    /// Rate limit exceeded at the provider.
    RateLimitExceeded,
    /// Generic provider error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request_error",
            PaymentErrorCode::CardDeclined => "card_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_error",
            PaymentErrorCode::ProviderError => "api_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PaymentProvider) {}
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentErrorCode::NetworkError.is_retryable());
        assert!(PaymentErrorCode::RateLimitExceeded.is_retryable());
        assert!(!PaymentErrorCode::CardDeclined.is_retryable());
        assert!(!PaymentErrorCode::InvalidRequest.is_retryable());
        assert!(PaymentError::network("timeout").retryable);
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::invalid_request("No such price");
        assert_eq!(err.to_string(), "invalid_request_error: No such price");
    }

    #[test]
    fn converts_to_provider_gateway_error() {
        let err = PaymentError::invalid_request("No such customer")
            .with_provider_code("resource_missing")
            .into_gateway_error("Failed to create checkout session");

        match err {
            GatewayError::Provider {
                context,
                details,
                provider_type,
                provider_code,
            } => {
                assert_eq!(context, "Failed to create checkout session");
                assert_eq!(details, "No such customer");
                assert_eq!(provider_type.as_deref(), Some("invalid_request_error"));
                assert_eq!(provider_code.as_deref(), Some("resource_missing"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

//! Mock payment provider for testing.
//!
//! An in-memory stand-in for `PaymentProvider` used by unit and integration
//! tests. Supports:
//! - Customers stored by email, so lookups find what was created
//! - Error injection per method
//! - Call tracking and captured requests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::payment::CustomerRef;

use crate::ports::{
    CheckoutSession, CreateCheckoutSessionRequest, CreateCustomerRequest,
    CreatePaymentIntentRequest, CustomerIdentity, PaymentError, PaymentIntent, PaymentProvider,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.add_customer(CustomerIdentity { id: "cus_123".into(), ... });
/// mock.set_method_error("create_checkout_session", PaymentError::provider("down"));
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Customers in insertion order.
    customers: Vec<CustomerIdentity>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    checkout_requests: Vec<CreateCheckoutSessionRequest>,

    payment_intent_requests: Vec<CreatePaymentIntentRequest>,

    customer_requests: Vec<CreateCustomerRequest>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock provider with no customers.
    pub fn new() -> Self {
        Self::default()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a customer to the "database".
    pub fn add_customer(&self, customer: CustomerIdentity) {
        self.inner.lock().unwrap().customers.push(customer);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        self.inner.lock().unwrap().method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Count calls to a specific method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Total number of provider calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.inner.lock().unwrap().call_log.len()
    }

    pub fn customers(&self) -> Vec<CustomerIdentity> {
        self.inner.lock().unwrap().customers.clone()
    }

    pub fn customer_requests(&self) -> Vec<CreateCustomerRequest> {
        self.inner.lock().unwrap().customer_requests.clone()
    }

    pub fn checkout_requests(&self) -> Vec<CreateCheckoutSessionRequest> {
        self.inner.lock().unwrap().checkout_requests.clone()
    }

    pub fn payment_intent_requests(&self) -> Vec<CreatePaymentIntentRequest> {
        self.inner.lock().unwrap().payment_intent_requests.clone()
    }

    /// Logs the call and returns the injected error, if any.
    fn record(&self, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.method_errors.get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<CustomerIdentity>, PaymentError> {
        self.record(
            "find_customers_by_email",
            vec![email.to_string(), limit.to_string()],
        )?;

        let state = self.inner.lock().unwrap();
        Ok(state
            .customers
            .iter()
            .rev()
            .filter(|c| c.email == email)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerIdentity, PaymentError> {
        self.record("create_customer", vec![request.email.clone()])?;

        let customer = CustomerIdentity {
            id: format!("cus_{}", short_id()),
            email: request.email.clone(),
            name: request.name.clone(),
            metadata: request.metadata.clone(),
        };

        let mut state = self.inner.lock().unwrap();
        state.customer_requests.push(request);
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record(
            "create_checkout_session",
            vec![request.mode.as_str().to_string()],
        )?;

        let id = format!("cs_test_{}", short_id());
        let session = CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
            mode: request.mode,
            customer_id: match &request.customer {
                CustomerRef::Id(id) => Some(id.clone()),
                _ => None,
            },
        };

        self.inner.lock().unwrap().checkout_requests.push(request);
        Ok(session)
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        self.record(
            "create_payment_intent",
            vec![request.amount.to_string(), request.currency.code().to_string()],
        )?;

        let id = format!("pi_{}", short_id());
        let intent = PaymentIntent {
            client_secret: format!("{}_secret_{}", id, short_id()),
            id,
            amount: request.amount,
            currency: request.currency,
        };

        self.inner
            .lock()
            .unwrap()
            .payment_intent_requests
            .push(request);
        Ok(intent)
    }
}

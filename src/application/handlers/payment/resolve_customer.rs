//! CustomerResolver - idempotent lookup-or-create of a billing identity by email.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::ports::{CreateCustomerRequest, CustomerIdentity, PaymentError, PaymentProvider};

/// Command to resolve the customer for an email.
#[derive(Debug, Clone)]
pub struct ResolveCustomerCommand {
    pub email: String,
    pub name: Option<String>,
    /// Attached only when a new customer is created.
    pub metadata: BTreeMap<String, String>,
}

impl ResolveCustomerCommand {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Tags the created customer with `source`.
    pub fn with_source(mut self, source: &str) -> Self {
        self.metadata.insert("source".to_string(), source.to_string());
        self
    }

    /// Caller metadata; keys override earlier entries such as `source`.
    pub fn with_metadata(mut self, metadata: &BTreeMap<String, String>) -> Self {
        self.metadata
            .extend(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

/// Resolves a customer by email, creating one only when none exists.
///
/// Lookups never mutate an existing customer. Two concurrent first-time
/// resolutions for the same email can still create two records.
pub struct CustomerResolver {
    payment_provider: Arc<dyn PaymentProvider>,
}

impl CustomerResolver {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self { payment_provider }
    }

    pub async fn resolve(
        &self,
        cmd: ResolveCustomerCommand,
    ) -> Result<CustomerIdentity, PaymentError> {
        // 1. Exact-email lookup; first match wins
        let existing = self
            .payment_provider
            .find_customers_by_email(&cmd.email, 1)
            .await?;

        if let Some(customer) = existing.into_iter().next() {
            tracing::debug!(customer_id = %customer.id, "Resolved existing customer");
            return Ok(customer);
        }

        // 2. Create with a creation timestamp
        let mut metadata = cmd.metadata;
        metadata.insert("created_at".to_string(), Timestamp::now().to_rfc3339());

        let customer = self
            .payment_provider
            .create_customer(CreateCustomerRequest {
                email: cmd.email,
                name: cmd.name,
                metadata,
                idempotency_key: None,
            })
            .await?;

        tracing::info!(customer_id = %customer.id, "Created customer");
        Ok(customer)
    }
}

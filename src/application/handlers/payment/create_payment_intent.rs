//! CreatePaymentIntentHandler - creates a payment intent for a custom amount.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{GatewayError, Timestamp};
use crate::domain::payment::PaymentIntentRequest;
use crate::ports::{CreatePaymentIntentRequest, PaymentProvider};

use super::resolve_customer::{CustomerResolver, ResolveCustomerCommand};

/// Public message for any provider-side failure.
pub const PAYMENT_INTENT_FAILED_MESSAGE: &str = "Failed to create payment intent";

/// Command carrying an already validated payment-intent request.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    pub request: PaymentIntentRequest,
}

/// Result returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResult {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Handler for payment intent creation.
pub struct CreatePaymentIntentHandler {
    resolver: CustomerResolver,
    payment_provider: Arc<dyn PaymentProvider>,
}

impl CreatePaymentIntentHandler {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            resolver: CustomerResolver::new(payment_provider.clone()),
            payment_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<CreatePaymentIntentResult, GatewayError> {
        let request = cmd.request;

        // 1. Resolve customer when an email was supplied
        let customer_id = match &request.customer_email {
            Some(email) => {
                let customer = self
                    .resolver
                    .resolve(
                        ResolveCustomerCommand::new(email.clone())
                            .with_name(request.customer_name.clone())
                            .with_source("payment_intent_api")
                            .with_metadata(&request.metadata),
                    )
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Customer resolution failed");
                        e.into_gateway_error(PAYMENT_INTENT_FAILED_MESSAGE)
                    })?;
                Some(customer.id)
            }
            None => None,
        };

        // 2. Create the intent
        let mut metadata = request.metadata;
        metadata
            .entry("source".to_string())
            .or_insert_with(|| "api".to_string());
        metadata.insert("created_at".to_string(), Timestamp::now().to_rfc3339());

        let intent = self
            .payment_provider
            .create_payment_intent(CreatePaymentIntentRequest {
                amount: request.amount,
                currency: request.currency,
                customer_id,
                description: request.description,
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Payment intent creation failed");
                e.into_gateway_error(PAYMENT_INTENT_FAILED_MESSAGE)
            })?;

        tracing::info!(
            payment_intent_id = %intent.id,
            amount = %intent.currency.format_minor(intent.amount),
            "Created payment intent"
        );

        Ok(CreatePaymentIntentResult {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::payment::{Currency, PaymentIntentDraft};
    use crate::ports::PaymentError;
    use std::collections::BTreeMap;

    fn request(email: Option<&str>) -> PaymentIntentRequest {
        PaymentIntentDraft {
            amount: Some(2500.0),
            currency: Some("eur".to_string()),
            customer_email: email.map(str::to_string),
            description: Some("Donation".to_string()),
            metadata: BTreeMap::from([("campaign".to_string(), "spring".to_string())]),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn creates_intent_with_api_metadata() {
        let mock = MockPaymentProvider::new();
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock.clone()));

        let result = handler
            .handle(CreatePaymentIntentCommand {
                request: request(None),
            })
            .await
            .unwrap();

        assert!(result.client_secret.starts_with(&result.payment_intent_id));
        let sent = &mock.payment_intent_requests()[0];
        assert_eq!(sent.amount, 2500);
        assert_eq!(sent.currency, Currency::Eur);
        assert_eq!(sent.customer_id, None);
        assert_eq!(sent.description.as_deref(), Some("Donation"));
        assert_eq!(sent.metadata["source"], "api");
        assert_eq!(sent.metadata["campaign"], "spring");
        assert!(sent.metadata.contains_key("created_at"));
        assert!(!mock.was_called("find_customers_by_email"));
    }

    #[tokio::test]
    async fn email_attaches_customer() {
        let mock = MockPaymentProvider::new();
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock.clone()));

        handler
            .handle(CreatePaymentIntentCommand {
                request: request(Some("ada@example.com")),
            })
            .await
            .unwrap();

        let customer = &mock.customers()[0];
        assert_eq!(customer.metadata["source"], "payment_intent_api");
        assert_eq!(
            mock.payment_intent_requests()[0].customer_id.as_deref(),
            Some(customer.id.as_str())
        );
    }

    #[tokio::test]
    async fn provider_failure_uses_generic_message() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error(
            "create_payment_intent",
            PaymentError::authentication("Invalid API Key provided"),
        );
        let handler = CreatePaymentIntentHandler::new(Arc::new(mock.clone()));

        let err = handler
            .handle(CreatePaymentIntentCommand {
                request: request(None),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), PAYMENT_INTENT_FAILED_MESSAGE);
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn result_serializes_camel_case() {
        let json = serde_json::to_value(CreatePaymentIntentResult {
            client_secret: "pi_1_secret_x".to_string(),
            payment_intent_id: "pi_1".to_string(),
        })
        .unwrap();
        assert_eq!(json["clientSecret"], "pi_1_secret_x");
        assert_eq!(json["paymentIntentId"], "pi_1");
    }
}

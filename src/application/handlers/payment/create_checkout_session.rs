//! CreateCheckoutSessionHandler - turns a validated checkout request into a hosted session.

use std::sync::Arc;

use crate::domain::foundation::GatewayError;
use crate::domain::payment::{CheckoutMode, CheckoutRequest, CustomerRef, InputError};
use crate::ports::PaymentProvider;

use super::resolve_customer::{CustomerResolver, ResolveCustomerCommand};
use super::session_builder::{PaymentSessionParams, SessionBuilder, SessionCreated};

/// Public message for any provider-side failure.
pub const CHECKOUT_FAILED_MESSAGE: &str = "Failed to create checkout session";

/// Customer metadata `source` tag for this flow.
const CUSTOMER_SOURCE: &str = "checkout_api";

/// Command carrying an already validated checkout request.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionCommand {
    pub request: CheckoutRequest,
}

/// Handler for checkout session creation.
///
/// Customer resolution happens only after validation has passed, so a
/// rejected request never touches the provider. A customer created here
/// is kept even when the session call then fails.
pub struct CreateCheckoutSessionHandler {
    resolver: CustomerResolver,
    builder: SessionBuilder,
}

impl CreateCheckoutSessionHandler {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self {
            resolver: CustomerResolver::new(payment_provider.clone()),
            builder: SessionBuilder::new(payment_provider),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<SessionCreated, GatewayError> {
        let request = cmd.request;

        if request.mode == CheckoutMode::Subscription {
            return Err(InputError::SubscriptionModeUnsupported.into());
        }

        let item = request
            .primary_item()
            .cloned()
            .ok_or(InputError::InvalidItems)?;

        if request.items.len() > 1 {
            tracing::warn!(
                item_count = request.items.len(),
                "Payment mode charges only the first line item"
            );
        }

        // 1. Resolve customer when an email was supplied
        let customer = match &request.customer_email {
            Some(email) => {
                let customer = self
                    .resolver
                    .resolve(
                        ResolveCustomerCommand::new(email.clone())
                            .with_name(request.customer_name.clone())
                            .with_source(CUSTOMER_SOURCE)
                            .with_metadata(&request.metadata),
                    )
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Customer resolution failed");
                        e.into_gateway_error(CHECKOUT_FAILED_MESSAGE)
                    })?;
                CustomerRef::Id(customer.id)
            }
            None => CustomerRef::Anonymous,
        };

        // 2. Build the session
        self.builder
            .build_payment_session(PaymentSessionParams {
                item,
                redirect: request.redirect,
                customer,
                metadata: request.metadata,
                allow_promotion_codes: request.allow_promotion_codes,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Checkout session creation failed");
                e.into_gateway_error(CHECKOUT_FAILED_MESSAGE)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::payment::{CheckoutDraft, LineItemDraft};
    use crate::ports::PaymentError;
    use std::collections::BTreeMap;

    const ORIGIN: &str = "https://app.example";

    fn item(name: &str, amount: f64) -> LineItemDraft {
        LineItemDraft {
            name: Some(name.to_string()),
            amount: Some(amount),
            currency: Some("usd".to_string()),
            ..Default::default()
        }
    }

    fn request(email: Option<&str>, items: Vec<LineItemDraft>) -> CheckoutRequest {
        CheckoutDraft {
            items: Some(items),
            customer_email: email.map(str::to_string),
            success_url: Some(format!("{}/success", ORIGIN)),
            cancel_url: Some(format!("{}/cancel", ORIGIN)),
            metadata: BTreeMap::from([("order".to_string(), "42".to_string())]),
            ..Default::default()
        }
        .validate(ORIGIN)
        .unwrap()
    }

    fn handler(mock: &MockPaymentProvider) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn anonymous_checkout_creates_session_without_customer() {
        let mock = MockPaymentProvider::new();

        let created = handler(&mock)
            .handle(CreateCheckoutSessionCommand {
                request: request(None, vec![item("Pro Plan", 9900.0)]),
            })
            .await
            .unwrap();

        assert!(!created.session_id.is_empty());
        assert!(!mock.was_called("find_customers_by_email"));
        let sent = &mock.checkout_requests()[0];
        assert_eq!(sent.customer, CustomerRef::Anonymous);
        assert_eq!(sent.metadata["order"], "42");
        assert!(sent.allow_promotion_codes);
    }

    #[tokio::test]
    async fn email_checkout_attaches_resolved_customer_id() {
        let mock = MockPaymentProvider::new();

        handler(&mock)
            .handle(CreateCheckoutSessionCommand {
                request: request(Some("ada@example.com"), vec![item("Pro Plan", 9900.0)]),
            })
            .await
            .unwrap();

        let customer = &mock.customers()[0];
        assert_eq!(customer.metadata["source"], "checkout_api");
        assert_eq!(customer.metadata["order"], "42");
        assert_eq!(
            mock.checkout_requests()[0].customer,
            CustomerRef::Id(customer.id.clone())
        );
    }

    #[tokio::test]
    async fn only_first_item_is_charged() {
        let mock = MockPaymentProvider::new();

        handler(&mock)
            .handle(CreateCheckoutSessionCommand {
                request: request(None, vec![item("First", 1000.0), item("Second", 2000.0)]),
            })
            .await
            .unwrap();

        match &mock.checkout_requests()[0].line_item {
            crate::ports::SessionLineItem::PriceData {
                name, unit_amount, ..
            } => {
                assert_eq!(name, "First");
                assert_eq!(*unit_amount, 1000);
            }
            other => panic!("unexpected line item {:?}", other),
        }
    }

    #[tokio::test]
    async fn provider_failure_maps_to_generic_message_with_details() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error(
            "create_checkout_session",
            PaymentError::invalid_request("No such currency")
                .with_provider_type("invalid_request_error")
                .with_provider_code("parameter_invalid"),
        );

        let err = handler(&mock)
            .handle(CreateCheckoutSessionCommand {
                request: request(None, vec![item("Pro Plan", 9900.0)]),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "provider_error");
        assert_eq!(err.to_string(), CHECKOUT_FAILED_MESSAGE);
        match err {
            GatewayError::Provider {
                details,
                provider_code,
                ..
            } => {
                assert_eq!(details, "No such currency");
                assert_eq!(provider_code.as_deref(), Some("parameter_invalid"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn customer_failure_skips_session_creation() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error("create_customer", PaymentError::network("reset"));

        let err = handler(&mock)
            .handle(CreateCheckoutSessionCommand {
                request: request(Some("ada@example.com"), vec![item("Pro Plan", 9900.0)]),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "provider_error");
        assert!(!mock.was_called("create_checkout_session"));
    }
}

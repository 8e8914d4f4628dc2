//! SessionBuilder - constructs one-time payment and subscription checkout sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::payment::{CheckoutMode, CustomerRef, LineItem, RedirectUrls};
use crate::ports::{CreateCheckoutSessionRequest, PaymentError, PaymentProvider, SessionLineItem};

/// Parameters for a one-time payment session.
#[derive(Debug, Clone)]
pub struct PaymentSessionParams {
    pub item: LineItem,
    pub redirect: RedirectUrls,
    pub customer: CustomerRef,
    pub metadata: BTreeMap<String, String>,
    pub allow_promotion_codes: bool,
}

/// Parameters for a subscription session over an existing provider price.
#[derive(Debug, Clone)]
pub struct SubscriptionSessionParams {
    pub price_id: String,
    pub trial_period_days: Option<u32>,
    pub redirect: RedirectUrls,
    pub customer: CustomerRef,
    pub metadata: BTreeMap<String, String>,
    pub allow_promotion_codes: bool,
}

/// A created session, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: String,
    pub url: String,
}

/// Builds checkout sessions through the payment provider.
///
/// Sessions are created once; provider failures are returned, never retried here.
pub struct SessionBuilder {
    payment_provider: Arc<dyn PaymentProvider>,
}

impl SessionBuilder {
    pub fn new(payment_provider: Arc<dyn PaymentProvider>) -> Self {
        Self { payment_provider }
    }

    /// Single dynamically priced line item.
    pub async fn build_payment_session(
        &self,
        params: PaymentSessionParams,
    ) -> Result<SessionCreated, PaymentError> {
        let item = params.item;
        let request = CreateCheckoutSessionRequest {
            mode: CheckoutMode::Payment,
            line_item: SessionLineItem::PriceData {
                name: item.name().to_string(),
                description: item.description().map(str::to_string),
                unit_amount: item.unit_amount(),
                currency: item.currency(),
                quantity: item.quantity(),
            },
            customer: params.customer,
            success_url: params.redirect.success.to_string(),
            cancel_url: params.redirect.cancel.to_string(),
            metadata: params.metadata,
            allow_promotion_codes: params.allow_promotion_codes,
            trial_period_days: None,
            require_billing_address: false,
        };

        self.create(request).await
    }

    /// Pre-existing price, quantity 1, billing address always collected.
    pub async fn build_subscription_session(
        &self,
        params: SubscriptionSessionParams,
    ) -> Result<SessionCreated, PaymentError> {
        let request = CreateCheckoutSessionRequest {
            mode: CheckoutMode::Subscription,
            line_item: SessionLineItem::Price {
                price_id: params.price_id,
                quantity: 1,
            },
            customer: params.customer,
            success_url: params.redirect.success.to_string(),
            cancel_url: params.redirect.cancel.to_string(),
            metadata: params.metadata,
            allow_promotion_codes: params.allow_promotion_codes,
            trial_period_days: params.trial_period_days,
            require_billing_address: true,
        };

        self.create(request).await
    }

    async fn create(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<SessionCreated, PaymentError> {
        let mode = request.mode;
        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await?;

        tracing::info!(
            session_id = %session.id,
            mode = mode.as_str(),
            "Created checkout session"
        );

        Ok(SessionCreated {
            session_id: session.id,
            url: session.url,
        })
    }
}

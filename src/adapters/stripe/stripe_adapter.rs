//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against Stripe's form-encoded REST
//! API. Network failures (connect errors and timeouts) are retried with a
//! linear backoff; HTTP error statuses are never retried here. Every POST
//! carries one `Idempotency-Key` across all of its attempts, so a retry after
//! a lost response replays the original result instead of creating a second
//! object.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(secret_key).with_timeout(Duration::from_secs(30));
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::payment::{CheckoutMode, Currency, CustomerRef};
use crate::ports::{
    CheckoutSession, CreateCheckoutSessionRequest, CreateCustomerRequest,
    CreatePaymentIntentRequest, CustomerIdentity, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, SessionLineItem,
};

use super::stripe_types::{
    StripeCheckoutSession, StripeCustomer, StripeErrorBody, StripeList, StripePaymentIntent,
};

/// Header Stripe uses to deduplicate retried writes.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Default Stripe API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Form parameters in submission order.
type FormParams = Vec<(String, String)>;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout.
    timeout: Duration,

    /// Extra attempts after a network failure.
    max_network_retries: u32,

    /// Delay unit; attempt `n` waits `n * retry_backoff`.
    retry_backoff: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration with production defaults.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_network_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_network_retries(mut self, retries: u32) -> Self {
        self.max_network_retries = retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_network_retries(&self) -> u32 {
        self.max_network_retries
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("max_network_retries", &self.max_network_retries)
            .finish()
    }
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
    }

    /// Sends a request, retrying connect failures and timeouts.
    async fn send_with_retries<F>(&self, operation: &str, build: F) -> Result<Response, PaymentError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.config.max_network_retries => {
                    attempt += 1;
                    tracing::warn!(
                        operation,
                        attempt,
                        error = %e,
                        "Stripe request failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                }
                Err(e) => {
                    tracing::error!(operation, error = %e, "Stripe request failed");
                    return Err(PaymentError::network(e.to_string()));
                }
            }
        }
    }

    /// Posts a form body; every attempt carries the same idempotency key.
    async fn post_form(
        &self,
        operation: &str,
        path: &str,
        params: &FormParams,
        idempotency_key: Option<&str>,
    ) -> Result<Response, PaymentError> {
        let url = self.url(path);
        let key = idempotency_key
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.send_with_retries(operation, || {
            self.authorized(self.http_client.post(&url))
                .header(IDEMPOTENCY_KEY_HEADER, key.as_str())
                .form(params)
        })
        .await
    }

    /// Checks the status and decodes the body.
    async fn read_response<T: DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = status.as_u16(),
                error = %error_text,
                "Stripe API call failed"
            );
            return Err(map_error_response(status, &error_text));
        }

        response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn find_customers_by_email(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<CustomerIdentity>, PaymentError> {
        let url = self.url("/v1/customers");
        let query = [("email", email.to_string()), ("limit", limit.to_string())];

        let response = self
            .send_with_retries("list_customers", || {
                self.authorized(self.http_client.get(&url)).query(&query)
            })
            .await?;

        let list: StripeList<StripeCustomer> =
            Self::read_response("list_customers", response).await?;

        Ok(list
            .data
            .into_iter()
            .filter(|c| !c.deleted)
            .map(|c| customer_identity(c, email))
            .collect())
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<CustomerIdentity, PaymentError> {
        let params = customer_params(&request);

        let response = self
            .post_form(
                "create_customer",
                "/v1/customers",
                &params,
                request.idempotency_key.as_deref(),
            )
            .await?;

        let customer: StripeCustomer = Self::read_response("create_customer", response).await?;

        tracing::info!(customer_id = %customer.id, "Created Stripe customer");

        Ok(customer_identity(customer, &request.email))
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = checkout_session_params(&request);

        let response = self
            .post_form("create_checkout_session", "/v1/checkout/sessions", &params, None)
            .await?;

        let session: StripeCheckoutSession =
            Self::read_response("create_checkout_session", response).await?;

        let url = session.url.ok_or_else(|| {
            PaymentError::provider("Stripe checkout session has no redirect URL")
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
            mode: request.mode,
            customer_id: session.customer.or(match request.customer {
                CustomerRef::Id(id) => Some(id),
                _ => None,
            }),
        })
    }

    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = payment_intent_params(&request);

        let response = self
            .post_form("create_payment_intent", "/v1/payment_intents", &params, None)
            .await?;

        let intent: StripePaymentIntent =
            Self::read_response("create_payment_intent", response).await?;

        let client_secret = intent
            .client_secret
            .ok_or_else(|| PaymentError::provider("Stripe payment intent has no client secret"))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
            currency: Currency::parse(&intent.currency).unwrap_or(request.currency),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Request Encoding
// ════════════════════════════════════════════════════════════════════════════════

fn customer_identity(customer: StripeCustomer, fallback_email: &str) -> CustomerIdentity {
    CustomerIdentity {
        id: customer.id,
        email: customer.email.unwrap_or_else(|| fallback_email.to_string()),
        name: customer.name,
        metadata: customer.metadata,
    }
}

fn push_metadata(params: &mut FormParams, prefix: &str, metadata: &BTreeMap<String, String>) {
    for (key, value) in metadata {
        params.push((format!("{}[{}]", prefix, key), value.clone()));
    }
}

fn customer_params(request: &CreateCustomerRequest) -> FormParams {
    let mut params = vec![("email".to_string(), request.email.clone())];
    if let Some(name) = &request.name {
        params.push(("name".to_string(), name.clone()));
    }
    push_metadata(&mut params, "metadata", &request.metadata);
    params
}

fn checkout_session_params(request: &CreateCheckoutSessionRequest) -> FormParams {
    let mut params = vec![
        ("mode".to_string(), request.mode.as_str().to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    match &request.line_item {
        SessionLineItem::PriceData {
            name,
            description,
            unit_amount,
            currency,
            quantity,
        } => {
            params.push(("payment_method_types[0]".into(), "card".into()));
            params.push((
                "line_items[0][price_data][currency]".into(),
                currency.code().into(),
            ));
            params.push((
                "line_items[0][price_data][product_data][name]".into(),
                name.clone(),
            ));
            if let Some(description) = description {
                params.push((
                    "line_items[0][price_data][product_data][description]".into(),
                    description.clone(),
                ));
            }
            params.push((
                "line_items[0][price_data][unit_amount]".into(),
                unit_amount.to_string(),
            ));
            params.push(("line_items[0][quantity]".into(), quantity.to_string()));
        }
        SessionLineItem::Price { price_id, quantity } => {
            params.push(("line_items[0][price]".into(), price_id.clone()));
            params.push(("line_items[0][quantity]".into(), quantity.to_string()));
        }
    }

    match &request.customer {
        CustomerRef::Id(id) => params.push(("customer".into(), id.clone())),
        CustomerRef::Email(email) => params.push(("customer_email".into(), email.clone())),
        CustomerRef::Anonymous => {}
    }

    push_metadata(&mut params, "metadata", &request.metadata);

    if request.allow_promotion_codes {
        params.push(("allow_promotion_codes".into(), "true".into()));
    }

    if request.mode == CheckoutMode::Subscription {
        if let Some(days) = request.trial_period_days {
            params.push((
                "subscription_data[trial_period_days]".into(),
                days.to_string(),
            ));
        }
        push_metadata(&mut params, "subscription_data[metadata]", &request.metadata);
    }

    if request.require_billing_address {
        params.push(("billing_address_collection".into(), "required".into()));
    }

    params
}

fn payment_intent_params(request: &CreatePaymentIntentRequest) -> FormParams {
    let mut params = vec![
        ("amount".to_string(), request.amount.to_string()),
        ("currency".to_string(), request.currency.code().to_string()),
        (
            "automatic_payment_methods[enabled]".to_string(),
            "true".to_string(),
        ),
    ];
    if let Some(customer_id) = &request.customer_id {
        params.push(("customer".into(), customer_id.clone()));
    }
    if let Some(description) = &request.description {
        params.push(("description".into(), description.clone()));
    }
    push_metadata(&mut params, "metadata", &request.metadata);
    params
}

/// Maps a non-2xx Stripe response onto a `PaymentError`.
fn map_error_response(status: StatusCode, body: &str) -> PaymentError {
    let code = match status {
        StatusCode::BAD_REQUEST => PaymentErrorCode::InvalidRequest,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentErrorCode::AuthenticationError,
        StatusCode::PAYMENT_REQUIRED => PaymentErrorCode::CardDeclined,
        StatusCode::NOT_FOUND => PaymentErrorCode::NotFound,
        StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
        _ => PaymentErrorCode::ProviderError,
    };

    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(parsed) => {
            let detail = parsed.error;
            let message = detail
                .message
                .unwrap_or_else(|| format!("Stripe API error ({})", status.as_u16()));
            let mut err = PaymentError::new(code, message);
            if let Some(error_type) = detail.error_type {
                err = err.with_provider_type(error_type);
            }
            if let Some(provider_code) = detail.code {
                err = err.with_provider_code(provider_code);
            }
            err
        }
        Err(_) => PaymentError::new(code, format!("Stripe API error: {}", body)),
    }
}

//! Stripe REST response bodies.
//!
//! Only the fields the gateway reads are captured; everything else in
//! Stripe's payloads is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Paginated list wrapper (`{"object":"list","data":[...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    pub email: Option<String>,

    pub name: Option<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Whether the customer has been deleted.
    #[serde(default)]
    pub deleted: bool,
}

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    /// Unique session identifier (cs_...).
    pub id: String,

    /// Hosted checkout page.
    pub url: Option<String>,

    /// Customer ID if one was attached.
    pub customer: Option<String>,

    /// payment, setup or subscription.
    pub mode: Option<String>,
}

/// Stripe PaymentIntent object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    /// Unique intent identifier (pi_...).
    pub id: String,

    /// Secret handed to the browser to confirm the payment.
    pub client_secret: Option<String>,

    pub amount: i64,

    pub currency: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Body
// ════════════════════════════════════════════════════════════════════════════════

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// api_error, card_error, invalid_request_error, ...
    #[serde(rename = "type")]
    pub error_type: Option<String>,

    pub code: Option<String>,

    pub message: Option<String>,

    pub param: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_customer_list() {
        let json = r#"{
            "object": "list",
            "data": [{ "id": "cus_1", "object": "customer", "email": "a@b.co", "name": null,
                       "metadata": { "source": "checkout_api" } }],
            "has_more": false,
            "url": "/v1/customers"
        }"#;
        let list: StripeList<StripeCustomer> = serde_json::from_str(json).unwrap();

        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].id, "cus_1");
        assert_eq!(list.data[0].metadata["source"], "checkout_api");
        assert!(!list.data[0].deleted);
    }

    #[test]
    fn parses_error_body() {
        let json = r#"{ "error": { "type": "invalid_request_error", "code": "resource_missing",
                        "message": "No such price: 'price_x'", "param": "line_items[0][price]" } }"#;
        let body: StripeErrorBody = serde_json::from_str(json).unwrap();

        assert_eq!(body.error.error_type.as_deref(), Some("invalid_request_error"));
        assert_eq!(body.error.code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn parses_checkout_session_with_url() {
        let json = r#"{ "id": "cs_test_1", "object": "checkout.session",
                        "url": "https://checkout.stripe.com/c/pay/cs_test_1", "mode": "payment",
                        "customer": null }"#;
        let session: StripeCheckoutSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.url.as_deref(), Some("https://checkout.stripe.com/c/pay/cs_test_1"));
        assert_eq!(session.customer, None);
    }
}

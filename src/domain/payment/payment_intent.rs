//! Payment-intent request model and its validation.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::currency::Currency;
use super::lenient;
use super::validation::{amount_in_bounds, is_valid_email, InputError, MAX_DESCRIPTION_CHARS};

/// Payment-intent body as submitted by the client, after sanitization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentDraft {
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::metadata")]
    pub metadata: BTreeMap<String, String>,
}

/// Validated payment-intent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: Currency,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntentDraft {
    /// Checks amount and currency, then email, then description.
    pub fn validate(self) -> Result<PaymentIntentRequest, InputError> {
        let raw_currency = self
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| Currency::DEFAULT.code().to_string());

        let (amount, currency) = match (self.amount, Currency::parse(&raw_currency)) {
            (Some(amount), Some(currency)) if amount_in_bounds(amount, currency) => {
                (amount as i64, currency)
            }
            _ => return Err(InputError::InvalidAmount { index: None }),
        };

        let customer_email = self.customer_email.filter(|e| !e.is_empty());
        if let Some(email) = &customer_email {
            if !is_valid_email(email) {
                return Err(InputError::InvalidEmail);
            }
        }

        let description = self.description.filter(|d| !d.is_empty());
        if let Some(description) = &description {
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                return Err(InputError::DescriptionTooLong);
            }
        }

        Ok(PaymentIntentRequest {
            amount,
            currency,
            customer_email,
            customer_name: self.customer_name.filter(|n| !n.is_empty()),
            description,
            metadata: self.metadata,
        })
    }
}

//! Checkout request model and its validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use super::lenient;
use super::line_item::{LineItem, LineItemDraft};
use super::validation::{
    is_valid_email, origin_of, parse_absolute_url, InputError, MAX_ITEMS, MIN_ITEMS,
};

/// Kind of checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    #[default]
    Payment,
    Subscription,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
        }
    }
}

/// Who a session is attached to. A resolved id and a raw email are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRef {
    Id(String),
    Email(String),
    Anonymous,
}

/// Post-checkout redirect targets, both absolute and same-origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUrls {
    pub success: Url,
    pub cancel: Url,
}

impl RedirectUrls {
    /// Parses both URLs and requires each to share `expected_origin`.
    pub fn parse(
        success: Option<&str>,
        cancel: Option<&str>,
        expected_origin: &str,
    ) -> Result<Self, InputError> {
        let (Some(success), Some(cancel)) = (
            success.filter(|s| !s.is_empty()),
            cancel.filter(|s| !s.is_empty()),
        ) else {
            return Err(InputError::MissingRedirectUrls);
        };

        let success = parse_absolute_url(success).ok_or(InputError::InvalidRedirectUrls)?;
        let cancel = parse_absolute_url(cancel).ok_or(InputError::InvalidRedirectUrls)?;

        if origin_of(&success) != expected_origin || origin_of(&cancel) != expected_origin {
            return Err(InputError::InvalidRedirectUrls);
        }

        Ok(Self { success, cancel })
    }
}

/// Checkout body as submitted by the client, after sanitization.
///
/// Wrongly typed fields decode leniently and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    #[serde(default, deserialize_with = "lenient::mode")]
    pub mode: CheckoutMode,
    #[serde(default, deserialize_with = "lenient::items")]
    pub items: Option<Vec<LineItemDraft>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub success_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cancel_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::metadata")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub allow_promotion_codes: Option<bool>,
}

/// Fully validated checkout request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    pub items: Vec<LineItem>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub redirect: RedirectUrls,
    pub metadata: BTreeMap<String, String>,
    pub allow_promotion_codes: bool,
}

impl CheckoutDraft {
    /// Validates every field; any failure rejects the whole request.
    ///
    /// `expected_origin` is the origin the redirect URLs must share.
    pub fn validate(self, expected_origin: &str) -> Result<CheckoutRequest, InputError> {
        let drafts = self.items.unwrap_or_default();
        if drafts.len() < MIN_ITEMS || drafts.len() > MAX_ITEMS {
            return Err(InputError::InvalidItems);
        }

        let redirect = RedirectUrls::parse(
            self.success_url.as_deref(),
            self.cancel_url.as_deref(),
            expected_origin,
        )?;

        let customer_email = self.customer_email.filter(|e| !e.is_empty());
        if let Some(email) = &customer_email {
            if !is_valid_email(email) {
                return Err(InputError::InvalidEmail);
            }
        }

        let items = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| draft.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        if self.mode == CheckoutMode::Subscription {
            return Err(InputError::SubscriptionModeUnsupported);
        }

        Ok(CheckoutRequest {
            mode: self.mode,
            items,
            customer_email,
            customer_name: self.customer_name.filter(|n| !n.is_empty()),
            redirect,
            metadata: self.metadata,
            allow_promotion_codes: self.allow_promotion_codes.unwrap_or(true),
        })
    }
}

impl CheckoutRequest {
    /// The item a one-time payment session is built from.
    ///
    /// Payment mode honors only the first item of a multi-item request.
    pub fn primary_item(&self) -> Option<&LineItem> {
        self.items.first()
    }
}

//! Field-specific checks applied after sanitization.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::domain::foundation::{GatewayError, SecurityEventKind};

use super::currency::Currency;

/// Maximum characters in a line item name.
pub const MAX_ITEM_NAME_CHARS: usize = 200;

/// Items accepted per checkout request.
pub const MIN_ITEMS: usize = 1;
pub const MAX_ITEMS: usize = 100;

/// Inclusive quantity bounds per line item.
pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 999;

/// Maximum characters in a payment-intent description.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Reason a request body was rejected before any provider call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Invalid request body")]
    MalformedBody(String),

    #[error("Invalid items array")]
    InvalidItems,

    #[error("Success URL and Cancel URL are required")]
    MissingRedirectUrls,

    #[error("Invalid success or cancel URL")]
    InvalidRedirectUrls,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid item name")]
    InvalidItemName { index: usize },

    #[error("Invalid amount or currency")]
    InvalidAmount { index: Option<usize> },

    #[error("Currency {currency} is not supported")]
    UnsupportedCurrency { currency: String },

    #[error("Invalid quantity")]
    InvalidQuantity { index: usize },

    #[error("Description too long")]
    DescriptionTooLong,

    #[error("Subscription mode not implemented yet")]
    SubscriptionModeUnsupported,
}

impl InputError {
    /// Request field the rejection refers to.
    pub fn field(&self) -> String {
        match self {
            InputError::MalformedBody(_) => "body".to_string(),
            InputError::InvalidItems => "items".to_string(),
            InputError::MissingRedirectUrls | InputError::InvalidRedirectUrls => {
                "successUrl".to_string()
            }
            InputError::InvalidEmail => "customerEmail".to_string(),
            InputError::InvalidItemName { index } => format!("items[{}].name", index),
            InputError::InvalidAmount { index: Some(index) } => format!("items[{}].amount", index),
            InputError::InvalidAmount { index: None } => "amount".to_string(),
            InputError::UnsupportedCurrency { .. } => "currency".to_string(),
            InputError::InvalidQuantity { index } => format!("items[{}].quantity", index),
            InputError::DescriptionTooLong => "description".to_string(),
            InputError::SubscriptionModeUnsupported => "mode".to_string(),
        }
    }

    /// Security event recorded for this rejection, if any.
    pub fn security_event(&self) -> Option<SecurityEventKind> {
        match self {
            InputError::InvalidItems => Some(SecurityEventKind::InvalidItems),
            InputError::InvalidRedirectUrls => Some(SecurityEventKind::InvalidUrls),
            InputError::InvalidEmail => Some(SecurityEventKind::InvalidEmail),
            InputError::InvalidItemName { .. } => Some(SecurityEventKind::InvalidItemName),
            InputError::InvalidAmount { .. } => Some(SecurityEventKind::InvalidAmount),
            InputError::UnsupportedCurrency { .. } => Some(SecurityEventKind::UnsupportedCurrency),
            InputError::InvalidQuantity { .. } => Some(SecurityEventKind::InvalidQuantity),
            InputError::DescriptionTooLong => Some(SecurityEventKind::InvalidDescription),
            InputError::MalformedBody(_)
            | InputError::MissingRedirectUrls
            | InputError::SubscriptionModeUnsupported => None,
        }
    }
}

impl From<InputError> for GatewayError {
    fn from(err: InputError) -> Self {
        GatewayError::validation(err.field(), err.to_string())
    }
}

/// Returns true iff `amount` is an integer within the currency's bounds.
///
/// Unknown currencies are never valid.
pub fn validate_amount(amount: f64, currency: &str) -> bool {
    let Some(currency) = Currency::parse(currency) else {
        return false;
    };
    amount_in_bounds(amount, currency)
}

pub(crate) fn amount_in_bounds(amount: f64, currency: Currency) -> bool {
    amount.is_finite()
        && amount.fract() == 0.0
        && amount >= currency.min_amount() as f64
        && amount <= currency.max_amount() as f64
}

/// Permissive `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Parses an absolute URL. Relative references are rejected.
pub fn parse_absolute_url(raw: &str) -> Option<Url> {
    Url::parse(raw).ok()
}

/// Serialized origin (`scheme://host[:port]`) of a URL.
///
/// Opaque origins serialize as `"null"` and never match a configured origin.
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Parses `raw` and returns its origin, if it is an absolute URL.
pub fn origin_of_str(raw: &str) -> Option<String> {
    parse_absolute_url(raw).map(|u| origin_of(&u))
}

/// Non-empty and at most [`MAX_ITEM_NAME_CHARS`] characters.
pub fn is_valid_item_name(name: &str) -> bool {
    !name.is_empty() && name.chars().count() <= MAX_ITEM_NAME_CHARS
}

/// Integer in `[MIN_QUANTITY, MAX_QUANTITY]`.
pub fn parse_quantity(quantity: f64) -> Option<u32> {
    if quantity.is_finite()
        && quantity.fract() == 0.0
        && quantity >= MIN_QUANTITY as f64
        && quantity <= MAX_QUANTITY as f64
    {
        Some(quantity as u32)
    } else {
        None
    }
}

//! Payment module - request models and the input validator.
//!
//! Untrusted bodies are first passed through [`sanitize`], then deserialized
//! into a draft type and validated into an immutable request. Validation is
//! all-or-nothing: the first failed check rejects the whole request. Fields of
//! the wrong JSON type fail their own check rather than the whole parse.

mod checkout;
mod currency;
mod lenient;
mod line_item;
mod payment_intent;
mod sanitize;
mod validation;

pub use checkout::{CheckoutDraft, CheckoutMode, CheckoutRequest, CustomerRef, RedirectUrls};
pub use currency::{Currency, UnsupportedCurrency, MAX_AMOUNT_MINOR};
pub use line_item::{LineItem, LineItemDraft};
pub use payment_intent::{PaymentIntentDraft, PaymentIntentRequest};
pub use sanitize::{
    sanitize, sanitize_string, MAX_ARRAY_LEN, MAX_KEY_CHARS, MAX_SAFE_INTEGER, MAX_STRING_CHARS,
};
pub use validation::{
    is_valid_email, is_valid_item_name, origin_of, origin_of_str, parse_absolute_url,
    parse_quantity, validate_amount, InputError, MAX_DESCRIPTION_CHARS, MAX_ITEMS,
    MAX_ITEM_NAME_CHARS, MAX_QUANTITY, MIN_ITEMS, MIN_QUANTITY,
};

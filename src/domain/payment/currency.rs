//! Supported settlement currencies and their amount bounds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest accepted amount in minor units, shared by every currency.
pub const MAX_AMOUNT_MINOR: i64 = 99_999_999;

/// Currency accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cad,
        Currency::Aud,
    ];

    /// Currency used when a request omits one.
    pub const DEFAULT: Currency = Currency::Usd;

    /// Parses an ISO code, case-insensitively.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "usd" => Some(Currency::Usd),
            "eur" => Some(Currency::Eur),
            "gbp" => Some(Currency::Gbp),
            "cad" => Some(Currency::Cad),
            "aud" => Some(Currency::Aud),
            _ => None,
        }
    }

    /// Lowercase ISO code as sent to the provider.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Eur => "eur",
            Currency::Gbp => "gbp",
            Currency::Cad => "cad",
            Currency::Aud => "aud",
        }
    }

    /// Smallest chargeable amount in minor units.
    pub fn min_amount(&self) -> i64 {
        match self {
            Currency::Gbp => 30,
            Currency::Usd | Currency::Eur | Currency::Cad | Currency::Aud => 50,
        }
    }

    pub fn max_amount(&self) -> i64 {
        MAX_AMOUNT_MINOR
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
        }
    }

    /// Renders an amount in minor units, e.g. `9900` in usd as `$99.00`.
    pub fn format_minor(&self, amount: i64) -> String {
        let sign = if amount < 0 { "-" } else { "" };
        let abs = amount.unsigned_abs();
        format!("{}{}{}.{:02}", sign, self.symbol(), abs / 100, abs % 100)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::DEFAULT
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Currency {0} is not supported")]
pub struct UnsupportedCurrency(pub String);

impl FromStr for Currency {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::parse(s).ok_or_else(|| UnsupportedCurrency(s.to_string()))
    }
}

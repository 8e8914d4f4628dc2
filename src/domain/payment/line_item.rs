//! Validated, dynamically priced line item.

use serde::Deserialize;

use super::currency::Currency;
use super::lenient;
use super::validation::{amount_in_bounds, is_valid_item_name, parse_quantity, InputError};

/// A line item as submitted by the client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
}

/// Immutable line item with bounds-checked price and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    name: String,
    description: Option<String>,
    unit_amount: i64,
    currency: Currency,
    quantity: u32,
}

impl LineItem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Unit price in minor units.
    pub fn unit_amount(&self) -> i64 {
        self.unit_amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl LineItemDraft {
    /// Validates the draft at position `index` of the request's item list.
    ///
    /// Checks run name, currency, amount, quantity; the first failure wins.
    pub fn validate(self, index: usize) -> Result<LineItem, InputError> {
        let name = self.name.unwrap_or_default();
        if !is_valid_item_name(&name) {
            return Err(InputError::InvalidItemName { index });
        }

        let raw_currency = self
            .currency
            .unwrap_or_else(|| Currency::DEFAULT.code().to_string());
        let currency = Currency::parse(&raw_currency).ok_or(InputError::UnsupportedCurrency {
            currency: raw_currency,
        })?;

        let amount = self.amount.ok_or(InputError::InvalidAmount { index: Some(index) })?;
        if !amount_in_bounds(amount, currency) {
            return Err(InputError::InvalidAmount { index: Some(index) });
        }

        let quantity = match self.quantity {
            None => 1,
            Some(q) => parse_quantity(q).ok_or(InputError::InvalidQuantity { index })?,
        };

        Ok(LineItem {
            name,
            description: self.description.filter(|d| !d.is_empty()),
            unit_amount: amount as i64,
            currency,
            quantity,
        })
    }
}

//! Tolerant field decoders for client-submitted drafts.
//!
//! A field holding the wrong JSON type never fails deserialization of the
//! whole body. Each decoder maps it onto a value the field's own validation
//! rejects, so the client gets the field-level error and the security sink
//! sees the matching event.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use super::checkout::CheckoutMode;
use super::line_item::LineItemDraft;

/// Numbers pass through; any other non-null value becomes NaN, which no
/// amount or quantity check accepts.
pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => Some(n.as_f64().unwrap_or(f64::NAN)),
        _ => Some(f64::NAN),
    })
}

/// Strings pass through; other non-null values keep their JSON text.
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Strings pass through; anything else is treated as absent.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Booleans pass through; anything else is treated as absent.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

/// `"subscription"` selects subscription mode; every other value is payment.
pub fn mode<'de, D>(deserializer: D) -> Result<CheckoutMode, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if s == CheckoutMode::Subscription.as_str() => CheckoutMode::Subscription,
        _ => CheckoutMode::Payment,
    })
}

/// A non-array becomes an empty list and fails the item-count check.
///
/// Elements that are not objects decode as an empty draft, which fails the
/// item-name check at their index.
pub fn items<'de, D>(deserializer: D) -> Result<Option<Vec<LineItemDraft>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Array(values) => Some(
            values
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap_or_default())
                .collect(),
        ),
        _ => Some(Vec::new()),
    })
}

/// Provider metadata is string-to-string.
///
/// Scalars are stringified; nulls, arrays and nested objects are dropped.
/// A non-object yields no metadata.
pub fn metadata<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "number")]
        n: Option<f64>,
        #[serde(default, deserialize_with = "string")]
        s: Option<String>,
        #[serde(default, deserialize_with = "text")]
        t: Option<String>,
        #[serde(default, deserialize_with = "metadata")]
        m: BTreeMap<String, String>,
    }

    fn decode(value: Value) -> Fields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn wrong_typed_number_is_nan() {
        assert!(decode(json!({ "n": "9900" })).n.unwrap().is_nan());
        assert!(decode(json!({ "n": [1] })).n.unwrap().is_nan());
        assert_eq!(decode(json!({ "n": 9900 })).n, Some(9900.0));
        assert_eq!(decode(json!({ "n": null })).n, None);
        assert_eq!(decode(json!({})).n, None);
    }

    #[test]
    fn string_keeps_json_text_of_other_types() {
        assert_eq!(decode(json!({ "s": 42 })).s.as_deref(), Some("42"));
        assert_eq!(decode(json!({ "s": "usd" })).s.as_deref(), Some("usd"));
    }

    #[test]
    fn text_drops_other_types() {
        assert_eq!(decode(json!({ "t": 42 })).t, None);
        assert_eq!(decode(json!({ "t": "Blue" })).t.as_deref(), Some("Blue"));
    }

    #[test]
    fn metadata_stringifies_scalars_and_drops_the_rest() {
        let m = decode(json!({
            "m": { "orderId": 42, "gift": true, "note": "hi", "nested": { "a": 1 }, "gone": null }
        }))
        .m;

        assert_eq!(m.get("orderId").map(String::as_str), Some("42"));
        assert_eq!(m.get("gift").map(String::as_str), Some("true"));
        assert_eq!(m.get("note").map(String::as_str), Some("hi"));
        assert!(!m.contains_key("nested"));
        assert!(!m.contains_key("gone"));

        assert!(decode(json!({ "m": "x" })).m.is_empty());
    }
}

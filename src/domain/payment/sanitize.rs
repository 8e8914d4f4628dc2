//! Shape-preserving sanitizer for untrusted JSON payloads.
//!
//! Runs before any field-specific check. It bounds the size of every string,
//! array and object and clamps numbers into the non-negative safe-integer range.

use serde_json::{Map, Number, Value};

/// Maximum characters kept from any string value or key.
pub const MAX_STRING_CHARS: usize = 1000;

/// Maximum elements kept from any array.
pub const MAX_ARRAY_LEN: usize = 100;

/// Object keys longer than this are dropped.
pub const MAX_KEY_CHARS: usize = 100;

/// 2^53 - 1, the largest integer a JSON client can represent exactly.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Sanitizes a value recursively, keeping its shape.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_string(&s)),
        Value::Number(n) => sanitize_number(&n),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .take(MAX_ARRAY_LEN)
                .map(sanitize)
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                if key.chars().count() > MAX_KEY_CHARS {
                    continue;
                }
                out.insert(sanitize_string(&key), sanitize(value));
            }
            Value::Object(out)
        }
        other => other,
    }
}

/// Strips angle brackets, trims, then keeps the first [`MAX_STRING_CHARS`] characters.
pub fn sanitize_string(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    stripped.trim().chars().take(MAX_STRING_CHARS).collect()
}

fn sanitize_number(n: &Number) -> Value {
    if let Some(u) = n.as_u64() {
        return Value::from(u.min(MAX_SAFE_INTEGER));
    }
    if n.is_i64() {
        // as_u64 failed, so the integer is negative
        return Value::from(0u64);
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => Value::from(f.min(MAX_SAFE_INTEGER as f64)),
        _ => Value::from(0u64),
    }
}

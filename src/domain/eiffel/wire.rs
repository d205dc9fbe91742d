//! Wire encoding for outbound events.
//!
//! Optional Eiffel members must be left out rather than sent as `null`;
//! consumers validating against the Eiffel schemas reject explicit nulls.

use serde::Serialize;
use serde_json::Value;

/// Serializes `value` to JSON with every `null` member removed.
pub fn to_wire_value<T: Serialize>(value: &T) -> serde_json::Result<Value> {
    serde_json::to_value(value).map(strip_nulls)
}

/// Recursively removes `null` object members, at any depth.
///
/// Objects nested inside arrays are cleaned too. `null` array elements are
/// kept since dropping them would shift positions.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// True if any object member at any depth is `null`.
pub fn contains_null_member(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.values().any(|v| v.is_null() || contains_null_member(v)),
        Value::Array(items) => items.iter().any(contains_null_member),
        _ => false,
    }
}

//! Decoding of delivered message bodies.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("message body is not UTF-8 JSON: {0}")]
    NotJson(String),
}

/// Decodes a message body into JSON.
///
/// Some producers serialize the event twice, sending a JSON string whose
/// content is the event object. Such a string is unwrapped once; any other
/// string is returned as is.
pub fn decode_body(body: &[u8]) -> Result<Value, BodyError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| BodyError::NotJson(e.to_string()))?;

    if let Value::String(inner) = &value {
        if let Ok(unwrapped @ Value::Object(_)) = serde_json::from_str::<Value>(inner) {
            return Ok(unwrapped);
        }
    }

    Ok(value)
}

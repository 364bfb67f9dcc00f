//! The settings write gate.
//!
//! A write is checked in three steps, stopping at the first failure:
//! 1. envelope: the request body is exactly `{"raw": "<string>"}`
//! 2. syntax: `raw` parses as a JSON5 object
//! 3. schema: the parsed object conforms to the composed schema
//!
//! Nothing here touches storage, so a failed check can never leave a partial
//! write behind.

use serde_json::{Map, Value};

use crate::composed::ComposedSchema;
use crate::error::ValidationError;

/// The only key accepted in a write envelope.
pub const ENVELOPE_KEY: &str = "raw";

/// Extract `raw` from a write request body.
///
/// # Errors
///
/// Returns `ValidationError::Envelope` when the body is not JSON, is not an
/// object, lacks `raw`, has a non-string `raw`, or carries any other key.
pub fn validate_payload_envelope(body: &[u8]) -> Result<String, ValidationError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::Envelope(format!("failed parsing JSON payload: {e}")))?;

    let Value::Object(mut envelope) = payload else {
        return Err(ValidationError::Envelope("payload is not an object".into()));
    };

    let mut extra: Vec<&str> = envelope
        .keys()
        .map(String::as_str)
        .filter(|key| *key != ENVELOPE_KEY)
        .collect();
    if !extra.is_empty() {
        extra.sort_unstable();
        return Err(ValidationError::Envelope(format!(
            "unexpected keys: {}",
            extra.join(", ")
        )));
    }

    match envelope.remove(ENVELOPE_KEY) {
        Some(Value::String(raw)) => Ok(raw),
        Some(_) => Err(ValidationError::Envelope("'raw' must be a string".into())),
        None => Err(ValidationError::Envelope("missing 'raw'".into())),
    }
}

/// Parse raw settings text as JSON5.
///
/// # Errors
///
/// Returns `ValidationError::Syntax` if `raw` is not well-formed JSON5 or is
/// not an object.
pub fn validate_syntax(raw: &str) -> Result<Map<String, Value>, ValidationError> {
    match json5::from_str::<Value>(raw) {
        Ok(Value::Object(parsed)) => Ok(parsed),
        Ok(_) => Err(ValidationError::Syntax("settings must be an object".into())),
        Err(e) => Err(ValidationError::Syntax(format!("{e}"))),
    }
}

/// Check parsed settings against a composed schema.
///
/// # Errors
///
/// Returns `ValidationError::Schema` listing every violated constraint.
pub fn validate_schema(
    parsed: &Map<String, Value>,
    schema: &ComposedSchema,
) -> Result<(), ValidationError> {
    let instance = Value::Object(parsed.clone());
    let errors: Vec<String> = schema
        .validator()
        .iter_errors(&instance)
        .map(|e| format!("{e}"))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Schema { errors })
    }
}

/// Run the full write gate and return the raw text to persist.
///
/// # Errors
///
/// The first failing check's `ValidationError`.
pub fn validate_write(body: &[u8], schema: &ComposedSchema) -> Result<String, ValidationError> {
    let raw = validate_payload_envelope(body)?;
    let parsed = validate_syntax(&raw)?;
    validate_schema(&parsed, schema)?;
    Ok(raw)
}

/// Fill in schema defaults for top-level properties absent from `parsed`.
#[must_use]
pub fn apply_defaults(mut parsed: Map<String, Value>, schema: &ComposedSchema) -> Map<String, Value> {
    if let Some(properties) = schema.properties() {
        for (key, property) in properties {
            if parsed.contains_key(key) {
                continue;
            }
            if let Some(default) = property.get("default") {
                parsed.insert(key.clone(), default.clone());
            }
        }
    }
    parsed
}

//! A composed plugin schema together with its compiled validator.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Base schema with overrides applied, compiled for validation.
///
/// Compilation happens once per resolution; the validator is shared so a
/// `ComposedSchema` is cheap to clone.
#[derive(Clone)]
pub struct ComposedSchema {
    document: Value,
    validator: Arc<jsonschema::Validator>,
}

impl ComposedSchema {
    /// Compile `document` as a JSON Schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchema` if the document is not a valid
    /// JSON Schema.
    pub fn compile(id: &str, document: Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(&document).map_err(|e| SchemaError::InvalidSchema {
                id: id.to_string(),
                reason: format!("{e}"),
            })?;
        Ok(Self {
            document,
            validator: Arc::new(validator),
        })
    }

    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> Value {
        self.document
    }

    /// The `properties` object, if the schema declares one.
    #[must_use]
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.document.get("properties").and_then(Value::as_object)
    }

    /// Declared default for a top-level property.
    #[must_use]
    pub fn default_for(&self, key: &str) -> Option<&Value> {
        self.properties()?.get(key)?.get("default")
    }

    pub(crate) fn validator(&self) -> &jsonschema::Validator {
        &self.validator
    }
}

impl fmt::Debug for ComposedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ComposedSchema {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

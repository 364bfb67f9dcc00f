//! Schema resolution: base schema + override fragments -> composed schema.

use knob_config::UnknownOverridePolicy;
use knob_core::PluginId;
use serde_json::{Map, Value};

use crate::composed::ComposedSchema;
use crate::error::SchemaError;
use crate::merge::DefaultNode;
use crate::registry::{OverrideFragment, OverrideScope, PluginRegistry};

/// Resolves composed schemas and package versions from a [`PluginRegistry`].
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    registry: PluginRegistry,
    policy: UnknownOverridePolicy,
}

impl SchemaResolver {
    #[must_use]
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            policy: UnknownOverridePolicy::default(),
        }
    }

    /// Set how override keys that name no schema property are handled.
    #[must_use]
    pub const fn with_policy(mut self, policy: UnknownOverridePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Compose the schema for `id` and look up its package version.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for unknown ids,
    /// `SchemaError::InvalidOverride` when the `Reject` policy refuses a key,
    /// and `SchemaError::InvalidSchema` if the result does not compile.
    pub fn resolve(&self, id: &PluginId) -> Result<(ComposedSchema, String), SchemaError> {
        let base = self.registry.base_schema(id)?;
        let fragments = self.registry.override_fragments(id);
        let document = compose(id, base, &fragments, self.policy)?;
        let schema = ComposedSchema::compile(id.as_str(), document)?;
        Ok((schema, self.registry.package_version(id)))
    }
}

/// Apply `fragments` in order to a copy of `base`.
///
/// Only `properties.<key>.default` is written. Kind conflicts are skipped
/// with a warning. Unknown keys in plugin-specific fragments follow `policy`;
/// unknown keys in global fragments are always skipped.
///
/// # Errors
///
/// Returns `SchemaError::InvalidOverride` for unknown keys under
/// `UnknownOverridePolicy::Reject`.
pub fn compose(
    id: &PluginId,
    base: &Value,
    fragments: &[OverrideFragment],
    policy: UnknownOverridePolicy,
) -> Result<Value, SchemaError> {
    let mut document = base.clone();
    if fragments.is_empty() {
        return Ok(document);
    }

    let mut empty = Map::new();
    let properties = document
        .get_mut("properties")
        .and_then(Value::as_object_mut)
        .unwrap_or(&mut empty);

    for fragment in fragments {
        for (key, value) in &fragment.values {
            let Some(property) = properties.get_mut(key).and_then(Value::as_object_mut) else {
                // `"*"` keys never trip `Reject`.
                match (policy, fragment.scope) {
                    (UnknownOverridePolicy::Ignore, _) | (_, OverrideScope::Global) => {
                        tracing::debug!(
                            %id,
                            key = %key,
                            origin = %fragment.origin,
                            "ignoring override for unknown property"
                        );
                        continue;
                    }
                    (UnknownOverridePolicy::Reject, OverrideScope::Plugin) => {
                        return Err(SchemaError::InvalidOverride {
                            id: id.to_string(),
                            key: key.clone(),
                            reason: format!("no such property (from {})", fragment.origin),
                        });
                    }
                }
            };

            let mut node = DefaultNode::from(property.remove("default").unwrap_or(Value::Null));
            for path in node.merge(DefaultNode::from(value.clone())) {
                let at = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{key}.{path}")
                };
                tracing::warn!(
                    %id,
                    property = %at,
                    origin = %fragment.origin,
                    "override would change default shape; skipped"
                );
            }
            property.insert("default".to_string(), node.into_value());
        }
    }

    Ok(document)
}

//! Load-once catalog of plugin schemas, versions, and override documents.
//!
//! A `PluginRegistry` is built at startup, either from disk via
//! [`PluginRegistry::load`] or in-process via [`PluginRegistry::builder`], and
//! never changes afterwards. It is passed by value into the
//! [`SchemaResolver`](crate::SchemaResolver).

use std::collections::BTreeMap;

use knob_core::PluginId;
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Version reported when a package declares none.
pub const UNKNOWN_VERSION: &str = "N/A";

/// Key in an override document that applies to every plugin.
pub const GLOBAL_OVERRIDE_KEY: &str = "*";

/// Where a plugin's schema came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSource {
    /// Shipped in the application's schemas directory.
    Builtin,
    /// Discovered in a federated extension directory.
    Federated,
}

#[derive(Debug, Clone)]
pub(crate) struct PluginEntry {
    pub(crate) schema: Value,
    pub(crate) version: Option<String>,
    pub(crate) source: PluginSource,
}

/// Whether a fragment came from the global (`"*"`) or plugin-specific section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideScope {
    Global,
    Plugin,
}

/// Default-value overrides for one plugin from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideFragment {
    /// Document the fragment came from (file path or builder label).
    pub origin: String,
    pub scope: OverrideScope,
    /// Property name -> replacement default.
    pub values: Map<String, Value>,
}

/// A parsed override document: plugin id (or `"*"`) -> property defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideDocument {
    origin: String,
    sections: BTreeMap<String, Map<String, Value>>,
}

impl OverrideDocument {
    /// Build from a parsed JSON/JSON5 value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Load` unless `value` is an object whose values
    /// are all objects.
    pub fn from_value(origin: impl Into<String>, value: Value) -> Result<Self, SchemaError> {
        let origin = origin.into();
        let Value::Object(top) = value else {
            return Err(SchemaError::Load {
                path: origin.into(),
                reason: "override document must be an object".into(),
            });
        };

        let mut sections = BTreeMap::new();
        for (key, section) in top {
            let Value::Object(values) = section else {
                return Err(SchemaError::Load {
                    path: origin.into(),
                    reason: format!("overrides for '{key}' must be an object"),
                });
            };
            sections.insert(key, values);
        }

        Ok(Self { origin, sections })
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.sections.get(key)
    }
}

/// Immutable plugin catalog.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    pub(crate) plugins: BTreeMap<PluginId, PluginEntry>,
    pub(crate) overrides: Vec<OverrideDocument>,
}

impl PluginRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// All registered ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &PluginId> {
        self.plugins.keys()
    }

    #[must_use]
    pub fn is_known(&self, id: &PluginId) -> bool {
        self.plugins.contains_key(id)
    }

    /// Look up a registered id by its string form.
    #[must_use]
    pub fn find(&self, raw: &str) -> Option<&PluginId> {
        self.plugins.get_key_value(raw).map(|(id, _)| id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// The plugin's declared schema, before overrides.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for unknown ids.
    pub fn base_schema(&self, id: &PluginId) -> Result<&Value, SchemaError> {
        self.entry(id).map(|entry| &entry.schema)
    }

    /// Where the plugin was discovered.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` for unknown ids.
    pub fn source(&self, id: &PluginId) -> Result<PluginSource, SchemaError> {
        self.entry(id).map(|entry| entry.source)
    }

    /// Owning package version, or `"N/A"` when unknown or undeclared.
    #[must_use]
    pub fn package_version(&self, id: &PluginId) -> String {
        self.plugins
            .get(id)
            .and_then(|entry| entry.version.clone())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// Override fragments for `id` in application order: every global
    /// (`"*"`) section first, then every plugin-specific section, each group
    /// in document order.
    #[must_use]
    pub fn override_fragments(&self, id: &PluginId) -> Vec<OverrideFragment> {
        let global = self.overrides.iter().filter_map(|doc| {
            doc.section(GLOBAL_OVERRIDE_KEY)
                .map(|values| (doc, OverrideScope::Global, values))
        });
        let specific = self.overrides.iter().filter_map(|doc| {
            doc.section(id.as_str())
                .map(|values| (doc, OverrideScope::Plugin, values))
        });

        global
            .chain(specific)
            .map(|(doc, scope, values)| OverrideFragment {
                origin: doc.origin.clone(),
                scope,
                values: values.clone(),
            })
            .collect()
    }

    fn entry(&self, id: &PluginId) -> Result<&PluginEntry, SchemaError> {
        self.plugins
            .get(id)
            .ok_or_else(|| SchemaError::NotFound(id.to_string()))
    }
}

/// In-process registry construction, mainly for embedding and tests.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: PluginRegistry,
}

impl RegistryBuilder {
    /// Register a builtin plugin without a package version.
    #[must_use]
    pub fn plugin(self, id: PluginId, schema: Value) -> Self {
        self.insert(id, schema, None, PluginSource::Builtin)
    }

    /// Register a builtin plugin whose package declares `version`.
    #[must_use]
    pub fn versioned_plugin(self, id: PluginId, schema: Value, version: impl Into<String>) -> Self {
        self.insert(id, schema, Some(version.into()), PluginSource::Builtin)
    }

    /// Register a federated plugin; it shadows a builtin with the same id.
    #[must_use]
    pub fn federated_plugin(self, id: PluginId, schema: Value, version: Option<String>) -> Self {
        self.insert(id, schema, version, PluginSource::Federated)
    }

    /// Append an override document; later documents apply after earlier ones.
    #[must_use]
    pub fn overrides(mut self, document: OverrideDocument) -> Self {
        self.registry.overrides.push(document);
        self
    }

    #[must_use]
    pub fn build(self) -> PluginRegistry {
        self.registry
    }

    pub(crate) fn insert(
        mut self,
        id: PluginId,
        schema: Value,
        version: Option<String>,
        source: PluginSource,
    ) -> Self {
        let shadowed = self
            .registry
            .plugins
            .get(&id)
            .is_some_and(|existing| existing.source == PluginSource::Federated);
        if shadowed && source == PluginSource::Builtin {
            tracing::debug!(%id, "builtin schema shadowed by federated extension");
            return self;
        }

        self.registry.plugins.insert(
            id,
            PluginEntry {
                schema,
                version,
                source,
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn id(raw: &str) -> PluginId {
        PluginId::parse(raw).unwrap()
    }

    #[test]
    fn ids_are_sorted() {
        let registry = PluginRegistry::builder()
            .plugin(id("b:one"), json!({}))
            .plugin(id("a:two"), json!({}))
            .build();
        let ids: Vec<&str> = registry.ids().map(PluginId::as_str).collect();
        assert_eq!(ids, vec!["a:two", "b:one"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = PluginRegistry::default();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.base_schema(&id("pkg:missing")),
            Err(SchemaError::NotFound(_))
        ));
        assert_eq!(registry.package_version(&id("pkg:missing")), "N/A");
    }

    #[test]
    fn version_defaults_to_na() {
        let registry = PluginRegistry::builder()
            .plugin(id("pkg:plain"), json!({}))
            .versioned_plugin(id("pkg:versioned"), json!({}), "1.2.3")
            .build();
        assert_eq!(registry.package_version(&id("pkg:plain")), "N/A");
        assert_eq!(registry.package_version(&id("pkg:versioned")), "1.2.3");
    }

    #[test]
    fn federated_shadows_builtin_in_either_order() {
        let first = PluginRegistry::builder()
            .plugin(id("pkg:p"), json!({"title": "builtin"}))
            .federated_plugin(id("pkg:p"), json!({"title": "federated"}), None)
            .build();
        let second = PluginRegistry::builder()
            .federated_plugin(id("pkg:p"), json!({"title": "federated"}), None)
            .plugin(id("pkg:p"), json!({"title": "builtin"}))
            .build();
        for registry in [first, second] {
            assert_eq!(
                registry.base_schema(&id("pkg:p")).unwrap()["title"],
                json!("federated")
            );
            assert_eq!(registry.source(&id("pkg:p")).unwrap(), PluginSource::Federated);
        }
    }

    #[test]
    fn fragments_order_global_then_plugin() {
        let first = OverrideDocument::from_value(
            "first",
            json!({"pkg:p": {"a": 1}, "*": {"b": 1}}),
        )
        .unwrap();
        let second = OverrideDocument::from_value(
            "second",
            json!({"*": {"b": 2}, "pkg:p": {"a": 2}, "pkg:other": {"c": 0}}),
        )
        .unwrap();
        let registry = PluginRegistry::builder()
            .plugin(id("pkg:p"), json!({}))
            .overrides(first)
            .overrides(second)
            .build();

        let fragments = registry.override_fragments(&id("pkg:p"));
        let order: Vec<(&str, OverrideScope)> = fragments
            .iter()
            .map(|f| (f.origin.as_str(), f.scope))
            .collect();
        assert_eq!(
            order,
            vec![
                ("first", OverrideScope::Global),
                ("second", OverrideScope::Global),
                ("first", OverrideScope::Plugin),
                ("second", OverrideScope::Plugin),
            ]
        );
    }

    #[test]
    fn override_document_must_be_object_of_objects() {
        assert!(OverrideDocument::from_value("x", json!([1])).is_err());
        assert!(OverrideDocument::from_value("x", json!({"pkg:p": 3})).is_err());
        assert!(OverrideDocument::from_value("x", json!({})).is_ok());
    }

    #[test]
    fn find_by_string() {
        let registry = PluginRegistry::builder()
            .plugin(id("pkg:p"), json!({}))
            .build();
        assert_eq!(registry.find("pkg:p"), Some(&id("pkg:p")));
        assert_eq!(registry.find("pkg:q"), None);
    }
}

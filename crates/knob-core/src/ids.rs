//! Plugin identifiers.
//!
//! A plugin id has the form `<package>:<plugin>`, for example
//! `@jupyterlab/apputils-extension:themes`. The package may be scoped
//! (`@scope/name`) and federated extensions conventionally carry a
//! `-federated` suffix on the package name.
//!
//! Ids double as storage keys, so parsing rejects anything that could not be
//! mapped onto a `<package>/<plugin>` directory layout safely.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IdError;

/// Suffix marking a federated extension package.
pub const FEDERATED_SUFFIX: &str = "-federated";

/// Validated `<package>:<plugin>` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginId(String);

impl PluginId {
    /// Parse and validate a plugin id.
    ///
    /// # Errors
    ///
    /// Returns `IdError` when the id is not `<package>:<plugin>` with two
    /// non-empty halves, or when a segment is not a plain path component.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let mut parts = raw.split(':');
        let (Some(package), Some(plugin), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(IdError::Separator(raw.to_string()));
        };

        if package.is_empty() || plugin.is_empty() {
            return Err(IdError::EmptyPart(raw.to_string()));
        }

        let package_ok = match package.split_once('/') {
            Some((scope, name)) => {
                scope.len() > 1 && scope.starts_with('@') && is_plain_segment(scope) && is_plain_segment(name)
            }
            None => is_plain_segment(package),
        };
        if !package_ok || !is_plain_segment(plugin) {
            return Err(IdError::InvalidSegment(raw.to_string()));
        }

        Ok(Self(raw.to_string()))
    }

    /// Build an id from its two halves.
    ///
    /// # Errors
    ///
    /// Same as [`PluginId::parse`].
    pub fn from_parts(package: &str, plugin: &str) -> Result<Self, IdError> {
        Self::parse(&format!("{package}:{plugin}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package half, e.g. `@jupyterlab/apputils-extension`.
    #[must_use]
    pub fn package(&self) -> &str {
        self.split().0
    }

    /// Plugin half, e.g. `themes`.
    #[must_use]
    pub fn plugin(&self) -> &str {
        self.split().1
    }

    /// Whether the package name carries the federated suffix.
    #[must_use]
    pub fn is_federated(&self) -> bool {
        self.package().ends_with(FEDERATED_SUFFIX)
    }

    fn split(&self) -> (&str, &str) {
        // Validated at construction: exactly one ':' is present.
        self.0.split_once(':').unwrap_or((self.0.as_str(), ""))
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '\0') || c.is_control())
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PluginId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PluginId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PluginId> for String {
    fn from(id: PluginId) -> Self {
        id.0
    }
}

impl AsRef<str> for PluginId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PluginId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_scoped_package() {
        let id = PluginId::parse("@jupyterlab/apputils-extension:themes").unwrap();
        assert_eq!(id.package(), "@jupyterlab/apputils-extension");
        assert_eq!(id.plugin(), "themes");
        assert!(!id.is_federated());
    }

    #[test]
    fn parses_unscoped_package() {
        let id = PluginId::parse("my-extension:plugin").unwrap();
        assert_eq!(id.package(), "my-extension");
        assert_eq!(id.plugin(), "plugin");
    }

    #[test]
    fn detects_federated_suffix() {
        let id = PluginId::parse("@jupyterlab/apputils-extension-federated:themes").unwrap();
        assert!(id.is_federated());
    }

    #[rstest]
    #[case("foo")]
    #[case("a:b:c")]
    #[case("")]
    fn rejects_bad_separator(#[case] raw: &str) {
        assert!(matches!(PluginId::parse(raw), Err(IdError::Separator(_))));
    }

    #[rstest]
    #[case(":plugin")]
    #[case("package:")]
    fn rejects_empty_parts(#[case] raw: &str) {
        assert!(matches!(PluginId::parse(raw), Err(IdError::EmptyPart(_))));
    }

    #[rstest]
    #[case("..:plugin")]
    #[case("pkg:..")]
    #[case("scope/name:plugin")]
    #[case("@/name:plugin")]
    #[case("@a/b/c:plugin")]
    #[case("pkg:sub/plugin")]
    #[case("pkg:back\\slash")]
    fn rejects_unsafe_segments(#[case] raw: &str) {
        assert!(matches!(PluginId::parse(raw), Err(IdError::InvalidSegment(_))));
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let id = PluginId::parse("@scope/pkg:plugin").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""@scope/pkg:plugin""#);
        let recovered: PluginId = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, id);
    }

    #[test]
    fn deserialize_rejects_invalid_id() {
        let result: Result<PluginId, _> = serde_json::from_str(r#""no-separator""#);
        assert!(result.is_err());
    }

    #[test]
    fn from_parts_matches_parse() {
        let id = PluginId::from_parts("@scope/pkg", "plugin").unwrap();
        assert_eq!(id.as_str(), "@scope/pkg:plugin");
    }

    #[test]
    fn ordering_follows_string_order() {
        let mut ids = vec![
            PluginId::parse("b:x").unwrap(),
            PluginId::parse("a:y").unwrap(),
            PluginId::parse("a:x").unwrap(),
        ];
        ids.sort();
        let rendered: Vec<&str> = ids.iter().map(PluginId::as_str).collect();
        assert_eq!(rendered, vec!["a:x", "a:y", "b:x"]);
    }
}

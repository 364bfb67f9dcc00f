//! Deep merge of default values over a typed node tree.
//!
//! Override fragments only ever touch `properties.<key>.default`. The merge
//! works on [`DefaultNode`] rather than raw JSON so the set of shapes is
//! closed: objects merge key by key, arrays and scalars replace wholesale, and
//! a node never changes kind.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Shape of a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Scalar,
}

/// A default value as a typed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultNode {
    Object(BTreeMap<String, DefaultNode>),
    Array(Vec<Value>),
    Scalar(Value),
}

impl DefaultNode {
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Object,
            Self::Array(_) => NodeKind::Array,
            Self::Scalar(_) => NodeKind::Scalar,
        }
    }

    fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Value::Null))
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
            Self::Array(items) => Value::Array(items),
            Self::Scalar(value) => value,
        }
    }

    /// Merge `overlay` into `self`.
    ///
    /// Returns the dotted paths (relative to this node) where the overlay was
    /// skipped because it would have changed the node kind. An empty `path`
    /// entry means the root itself conflicted. A `null` base adopts any
    /// overlay.
    pub fn merge(&mut self, overlay: Self) -> Vec<String> {
        let mut conflicts = Vec::new();
        self.merge_at(overlay, "", &mut conflicts);
        conflicts
    }

    fn merge_at(&mut self, overlay: Self, path: &str, conflicts: &mut Vec<String>) {
        if self.is_null() {
            *self = overlay;
            return;
        }

        match (self, overlay) {
            (Self::Object(base), Self::Object(over)) => {
                for (key, node) in over {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge_at(node, &child_path, conflicts),
                        None => {
                            base.insert(key, node);
                        }
                    }
                }
            }
            (base, over) if base.kind() == over.kind() => *base = over,
            _ => conflicts.push(path.to_string()),
        }
    }
}

impl From<Value> for DefaultNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items),
            scalar => Self::Scalar(scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn merged(base: Value, overlay: Value) -> (Value, Vec<String>) {
        let mut node = DefaultNode::from(base);
        let conflicts = node.merge(DefaultNode::from(overlay));
        (node.into_value(), conflicts)
    }

    #[test]
    fn scalar_replaces_scalar() {
        let (value, conflicts) = merged(json!("JupyterLab Light"), json!("JupyterLab Dark"));
        assert_eq!(value, json!("JupyterLab Dark"));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn scalars_of_different_json_types_still_replace() {
        let (value, _) = merged(json!(12), json!("12px"));
        assert_eq!(value, json!("12px"));
    }

    #[test]
    fn objects_merge_recursively() {
        let (value, conflicts) = merged(
            json!({"a": 1, "nested": {"x": true, "y": false}}),
            json!({"b": 2, "nested": {"y": true}}),
        );
        assert_eq!(value, json!({"a": 1, "b": 2, "nested": {"x": true, "y": true}}));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn arrays_replace_not_concatenate() {
        let (value, _) = merged(json!([1, 2, 3]), json!([4]));
        assert_eq!(value, json!([4]));
    }

    #[test]
    fn object_never_becomes_scalar() {
        let (value, conflicts) = merged(json!({"a": 1}), json!("flat"));
        assert_eq!(value, json!({"a": 1}));
        assert_eq!(conflicts, vec![String::new()]);
    }

    #[test]
    fn nested_conflict_reports_path() {
        let (value, conflicts) = merged(
            json!({"outer": {"inner": {"k": 1}}}),
            json!({"outer": {"inner": [1, 2]}}),
        );
        assert_eq!(value, json!({"outer": {"inner": {"k": 1}}}));
        assert_eq!(conflicts, vec!["outer.inner".to_string()]);
    }

    #[test]
    fn null_base_adopts_overlay() {
        let (value, conflicts) = merged(Value::Null, json!({"k": [1]}));
        assert_eq!(value, json!({"k": [1]}));
        assert!(conflicts.is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let base = json!({"keys": {"save": "Ctrl S"}, "size": 10});
        let overlay = json!({"keys": {"open": "Ctrl O"}, "size": 12});
        let (once, _) = merged(base.clone(), overlay.clone());
        let (twice, _) = merged(once.clone(), overlay);
        assert_eq!(once, twice);
    }
}

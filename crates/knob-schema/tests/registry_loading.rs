//! Integration tests for filesystem registry discovery and resolution.

use std::fs;
use std::path::Path;

use knob_config::{PathsConfig, UnknownOverridePolicy};
use knob_core::PluginId;
use knob_schema::{PluginRegistry, PluginSource, SchemaError, SchemaResolver};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn themes_schema() -> String {
    json!({
        "title": "Theme",
        "type": "object",
        "properties": {
            "theme": {"type": "string", "default": "JupyterLab Light"}
        }
    })
    .to_string()
}

/// Lay out builtin schemas, one federated extension, and an overrides file.
fn fixture() -> (TempDir, PathsConfig) {
    let root = tempfile::tempdir().unwrap();
    let schemas = root.path().join("schemas");
    let extensions = root.path().join("labextensions");
    let app = root.path().join("app");

    write(
        &schemas.join("@jupyterlab/apputils-extension/themes.json"),
        &themes_schema(),
    );
    write(
        &schemas.join("@jupyterlab/shortcuts-extension/plugin.json"),
        r#"{"type": "object", "properties": {"keyMap": {"type": "string", "default": "default"}}}"#,
    );
    write(
        &schemas.join("@jupyterlab/shortcuts-extension/package.json.orig"),
        r#"{"name": "@jupyterlab/shortcuts-extension", "version": "test-version"}"#,
    );
    write(
        &schemas.join("unscoped-extension/plugin.json"),
        r#"{"type": "object"}"#,
    );

    let federated = extensions.join("@jupyterlab/apputils-extension-federated");
    write(
        &federated.join("package.json"),
        r#"{"name": "@jupyterlab/apputils-extension-federated"}"#,
    );
    write(
        &federated.join("schemas/@jupyterlab/apputils-extension-federated/themes.json"),
        &themes_schema(),
    );

    write(
        &app.join("overrides.json"),
        r#"{"@jupyterlab/apputils-extension:themes": {"theme": "JupyterLab Dark"}}"#,
    );

    let paths = PathsConfig {
        schemas_dir: schemas.display().to_string(),
        settings_dir: root.path().join("settings").display().to_string(),
        app_settings_dir: app.display().to_string(),
        labextensions_path: vec![
            extensions.display().to_string(),
            root.path().join("missing").display().to_string(),
        ],
        override_files: Vec::new(),
    };
    (root, paths)
}

fn id(raw: &str) -> PluginId {
    PluginId::parse(raw).unwrap()
}

#[test]
fn discovers_builtin_and_federated_plugins() {
    let (_root, paths) = fixture();
    let registry = PluginRegistry::load(&paths).unwrap();

    let ids: Vec<&str> = registry.ids().map(PluginId::as_str).collect();
    assert_eq!(
        ids,
        vec![
            "@jupyterlab/apputils-extension-federated:themes",
            "@jupyterlab/apputils-extension:themes",
            "@jupyterlab/shortcuts-extension:plugin",
            "unscoped-extension:plugin",
        ]
    );
    assert_eq!(
        registry
            .source(&id("@jupyterlab/apputils-extension-federated:themes"))
            .unwrap(),
        PluginSource::Federated
    );
}

#[test]
fn versions_come_from_manifests() {
    let (_root, paths) = fixture();
    let registry = PluginRegistry::load(&paths).unwrap();

    assert_eq!(
        registry.package_version(&id("@jupyterlab/shortcuts-extension:plugin")),
        "test-version"
    );
    assert_eq!(
        registry.package_version(&id("@jupyterlab/apputils-extension:themes")),
        "N/A"
    );
    assert_eq!(
        registry.package_version(&id("@jupyterlab/apputils-extension-federated:themes")),
        "N/A"
    );
}

#[test]
fn overrides_json_is_respected() {
    let (_root, paths) = fixture();
    let resolver = SchemaResolver::new(PluginRegistry::load(&paths).unwrap());

    let (schema, _) = resolver
        .resolve(&id("@jupyterlab/apputils-extension:themes"))
        .unwrap();
    assert_eq!(
        schema.document()["properties"]["theme"]["default"],
        json!("JupyterLab Dark")
    );

    // The federated copy has its own id and is untouched.
    let (federated, _) = resolver
        .resolve(&id("@jupyterlab/apputils-extension-federated:themes"))
        .unwrap();
    assert_eq!(
        federated.document()["properties"]["theme"]["default"],
        json!("JupyterLab Light")
    );
}

#[test]
fn json5_overrides_and_extra_documents_layer_in_order() {
    let (root, mut paths) = fixture();
    let app = root.path().join("app");
    fs::remove_file(app.join("overrides.json")).unwrap();
    write(
        &app.join("overrides.json5"),
        "{\n  // deployment defaults\n  '@jupyterlab/apputils-extension:themes': { theme: 'From JSON5' },\n}",
    );
    let site = root.path().join("site.json");
    write(
        &site,
        r#"{"@jupyterlab/apputils-extension:themes": {"theme": "From site"}}"#,
    );
    paths.override_files = vec![site.display().to_string()];

    let resolver = SchemaResolver::new(PluginRegistry::load(&paths).unwrap());
    let (schema, _) = resolver
        .resolve(&id("@jupyterlab/apputils-extension:themes"))
        .unwrap();
    assert_eq!(
        schema.document()["properties"]["theme"]["default"],
        json!("From site")
    );
}

#[test]
fn missing_deployment_overrides_file_is_optional() {
    let (root, paths) = fixture();
    fs::remove_file(root.path().join("app/overrides.json")).unwrap();

    let resolver = SchemaResolver::new(PluginRegistry::load(&paths).unwrap());
    let (schema, _) = resolver
        .resolve(&id("@jupyterlab/apputils-extension:themes"))
        .unwrap();
    assert_eq!(
        schema.document()["properties"]["theme"]["default"],
        json!("JupyterLab Light")
    );
}

#[test]
fn missing_explicit_override_file_fails_load() {
    let (root, mut paths) = fixture();
    let missing = root.path().join("site-typo.json");
    paths.override_files = vec![missing.display().to_string()];

    match PluginRegistry::load(&paths) {
        Err(SchemaError::Load { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected a load error, got {other:?}"),
    }
}

#[test]
fn reject_policy_surfaces_unknown_override_keys() {
    let (root, paths) = fixture();
    write(
        &root.path().join("app/overrides.json"),
        r#"{"@jupyterlab/apputils-extension:themes": {"no-such-setting": 1}}"#,
    );

    let registry = PluginRegistry::load(&paths).unwrap();
    let lenient = SchemaResolver::new(registry.clone());
    assert!(lenient.resolve(&id("@jupyterlab/apputils-extension:themes")).is_ok());

    let strict = SchemaResolver::new(registry).with_policy(UnknownOverridePolicy::Reject);
    assert!(matches!(
        strict.resolve(&id("@jupyterlab/apputils-extension:themes")),
        Err(SchemaError::InvalidOverride { .. })
    ));
}

#[test]
fn malformed_schema_fails_load() {
    let (root, paths) = fixture();
    write(
        &root.path().join("schemas/broken-extension/plugin.json"),
        "{ not json",
    );
    assert!(matches!(
        PluginRegistry::load(&paths),
        Err(SchemaError::Load { .. })
    ));
}

#[test]
fn invalid_json_schema_fails_load() {
    let (root, paths) = fixture();
    write(
        &root.path().join("schemas/broken-extension/plugin.json"),
        r#"{"type": "not-a-type"}"#,
    );
    assert!(matches!(
        PluginRegistry::load(&paths),
        Err(SchemaError::InvalidSchema { .. })
    ));
}

#[test]
fn malformed_overrides_fail_load() {
    let (root, paths) = fixture();
    write(&root.path().join("app/overrides.json"), "[1, 2, 3]");
    assert!(matches!(
        PluginRegistry::load(&paths),
        Err(SchemaError::Load { .. })
    ));
}

#[test]
fn missing_schemas_dir_is_an_error() {
    let paths = PathsConfig {
        schemas_dir: "/definitely/not/here".into(),
        ..Default::default()
    };
    assert!(matches!(
        PluginRegistry::load(&paths),
        Err(SchemaError::Load { .. })
    ));
}

#[test]
fn unconfigured_paths_yield_empty_registry() {
    let registry = PluginRegistry::load(&PathsConfig::default()).unwrap();
    assert!(registry.is_empty());
}

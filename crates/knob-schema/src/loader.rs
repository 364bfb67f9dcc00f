//! Filesystem discovery for the plugin registry.
//!
//! Layout:
//! - builtin: `<schemas_dir>/<package>/<plugin>.json`, version in
//!   `<schemas_dir>/<package>/package.json.orig`
//! - federated: `<ext_root>/<package>/package.json` plus
//!   `<ext_root>/<package>/schemas/<package>/<plugin>.json`
//!
//! `<package>` is either `name` or `@scope/name`.

use std::fs;
use std::path::{Path, PathBuf};

use knob_config::{OverridePath, PathsConfig};
use knob_core::PluginId;
use serde_json::Value;

use crate::composed::ComposedSchema;
use crate::error::SchemaError;
use crate::registry::{OverrideDocument, PluginRegistry, PluginSource, RegistryBuilder};

const SCHEMA_EXTENSION: &str = "json";
const BUILTIN_MANIFEST: &str = "package.json.orig";
const FEDERATED_MANIFEST: &str = "package.json";

impl PluginRegistry {
    /// Discover schemas, federated extensions, and override documents.
    ///
    /// Missing optional directories and a missing deployment overrides file
    /// are skipped; a configured `schemas_dir` or `override_files` entry that
    /// does not exist is an error. Every schema must compile.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Load` for unreadable or malformed files and
    /// `SchemaError::InvalidSchema` for schemas that are not valid JSON Schema.
    pub fn load(paths: &PathsConfig) -> Result<Self, SchemaError> {
        let mut builder = Self::builder();

        if let Some(schemas_dir) = paths.schemas_dir() {
            if !schemas_dir.is_dir() {
                return Err(SchemaError::Load {
                    path: schemas_dir,
                    reason: "schemas directory does not exist".into(),
                });
            }
            builder = load_builtin(builder, &schemas_dir)?;
        }

        for ext_root in paths.labextensions_path() {
            if ext_root.is_dir() {
                builder = load_federated(builder, &ext_root)?;
            } else {
                tracing::debug!(path = %ext_root.display(), "skipping missing extensions directory");
            }
        }

        for OverridePath { path, required } in paths.override_documents() {
            if !path.is_file() {
                if required {
                    return Err(SchemaError::Load {
                        path,
                        reason: "override file does not exist".into(),
                    });
                }
                tracing::debug!(path = %path.display(), "no deployment override document");
                continue;
            }
            let value = read_json5(&path)?;
            builder = builder.overrides(OverrideDocument::from_value(
                path.display().to_string(),
                value,
            )?);
            tracing::debug!(path = %path.display(), "loaded override document");
        }

        let registry = builder.build();
        tracing::info!(plugins = registry.len(), "plugin registry loaded");
        Ok(registry)
    }
}

fn load_builtin(
    mut builder: RegistryBuilder,
    schemas_dir: &Path,
) -> Result<RegistryBuilder, SchemaError> {
    for (package, package_dir) in package_dirs(schemas_dir)? {
        let version = read_version(&package_dir.join(BUILTIN_MANIFEST))?;
        for (plugin, schema_path) in schema_files(&package_dir)? {
            let id = plugin_id(&package, &plugin, &schema_path)?;
            let schema = read_schema(&id, &schema_path)?;
            builder = builder.insert(id, schema, version.clone(), PluginSource::Builtin);
        }
    }
    Ok(builder)
}

fn load_federated(
    mut builder: RegistryBuilder,
    ext_root: &Path,
) -> Result<RegistryBuilder, SchemaError> {
    for (_, ext_dir) in package_dirs(ext_root)? {
        let manifest_path = ext_dir.join(FEDERATED_MANIFEST);
        if !manifest_path.is_file() {
            continue;
        }
        let manifest = read_json(&manifest_path)?;
        let Some(name) = manifest.get("name").and_then(Value::as_str) else {
            return Err(SchemaError::Load {
                path: manifest_path,
                reason: "package.json has no 'name'".into(),
            });
        };
        let version = manifest
            .get("version")
            .and_then(Value::as_str)
            .map(str::to_string);

        let schema_dir = ext_dir.join("schemas").join(name);
        if !schema_dir.is_dir() {
            continue;
        }
        for (plugin, schema_path) in schema_files(&schema_dir)? {
            let id = plugin_id(name, &plugin, &schema_path)?;
            let schema = read_schema(&id, &schema_path)?;
            builder = builder.insert(id, schema, version.clone(), PluginSource::Federated);
        }
    }
    Ok(builder)
}

/// `(package name, directory)` pairs under `root`, expanding `@scope` dirs.
fn package_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>, SchemaError> {
    let mut packages = Vec::new();
    for (name, path) in sorted_entries(root)? {
        if !path.is_dir() {
            continue;
        }
        if name.starts_with('@') {
            for (inner, inner_path) in sorted_entries(&path)? {
                if inner_path.is_dir() {
                    packages.push((format!("{name}/{inner}"), inner_path));
                }
            }
        } else {
            packages.push((name, path));
        }
    }
    Ok(packages)
}

/// `(plugin name, file)` pairs for every `*.json` schema in `dir`.
fn schema_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, SchemaError> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|(name, path)| {
            path.is_file()
                && name != FEDERATED_MANIFEST
                && path.extension().and_then(|e| e.to_str()) == Some(SCHEMA_EXTENSION)
        })
        .filter_map(|(_, path)| {
            let stem = path.file_stem()?.to_str()?.to_string();
            Some((stem, path))
        })
        .collect())
}

fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|e| load_error(dir, &e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| load_error(dir, &e))?;
        if let Some(name) = entry.file_name().to_str() {
            out.push((name.to_string(), entry.path()));
        }
    }
    out.sort();
    Ok(out)
}

fn plugin_id(package: &str, plugin: &str, path: &Path) -> Result<PluginId, SchemaError> {
    PluginId::from_parts(package, plugin).map_err(|e| load_error(path, &e))
}

fn read_schema(id: &PluginId, path: &Path) -> Result<Value, SchemaError> {
    let schema = read_json(path)?;
    // Fail at startup rather than on first request.
    ComposedSchema::compile(id.as_str(), schema.clone())?;
    Ok(schema)
}

fn read_version(path: &Path) -> Result<Option<String>, SchemaError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(read_json(path)?
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn read_json(path: &Path) -> Result<Value, SchemaError> {
    let text = fs::read_to_string(path).map_err(|e| load_error(path, &e))?;
    serde_json::from_str(&text).map_err(|e| load_error(path, &e))
}

fn read_json5(path: &Path) -> Result<Value, SchemaError> {
    let text = fs::read_to_string(path).map_err(|e| load_error(path, &e))?;
    json5::from_str(&text).map_err(|e| load_error(path, &e))
}

fn load_error(path: &Path, error: &dyn std::fmt::Display) -> SchemaError {
    SchemaError::Load {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}

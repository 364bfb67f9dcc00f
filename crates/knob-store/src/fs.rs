//! Filesystem backend: `<root>/<package>/<plugin>.knob-settings`.
//!
//! Writes go to a temp file in the destination directory and are renamed
//! into place, so readers never observe a half-written record.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use knob_core::PluginId;
use tempfile::NamedTempFile;

use crate::backend::StorageBackend;
use crate::error::StoreError;

const SETTINGS_EXTENSION: &str = "knob-settings";

#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the record for `id`.
    #[must_use]
    pub fn path_for(&self, id: &PluginId) -> PathBuf {
        self.root
            .join(id.package())
            .join(format!("{}.{SETTINGS_EXTENSION}", id.plugin()))
    }
}

impl StorageBackend for FsBackend {
    fn read(&self, id: &PluginId) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(id.as_str(), e)),
        }
    }

    fn write(&self, id: &PluginId, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(id);
        let io = |e: std::io::Error| StoreError::io(id.as_str(), e);

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(io)?;

        let mut tmp = NamedTempFile::new_in(parent).map_err(io)?;
        tmp.write_all(bytes).map_err(io)?;
        tmp.as_file().sync_all().map_err(io)?;
        tmp.persist(&path).map_err(|e| io(e.error))?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<PluginId>, StoreError> {
        let mut keys = Vec::new();
        for entry in read_dir(&self.root)? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('@') {
                for inner in read_dir(&path)? {
                    let inner_path = inner.path();
                    let inner_name = inner.file_name();
                    if let (true, Some(inner_name)) = (inner_path.is_dir(), inner_name.to_str()) {
                        collect_keys(&format!("{name}/{inner_name}"), &inner_path, &mut keys)?;
                    }
                }
            } else {
                collect_keys(&name, &path, &mut keys)?;
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn exists(&self, id: &PluginId) -> Result<bool, StoreError> {
        Ok(self.path_for(id).is_file())
    }
}

fn collect_keys(package: &str, dir: &Path, keys: &mut Vec<PluginId>) -> Result<(), StoreError> {
    for entry in read_dir(dir)? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SETTINGS_EXTENSION) {
            continue;
        }
        let Some(plugin) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match PluginId::from_parts(package, plugin) {
            Ok(id) => keys.push(id),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "skipping unrecognised settings file");
            }
        }
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>, StoreError> {
    let key = dir.display().to_string();
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::io(key, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(StoreError::io(key, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(raw: &str) -> PluginId {
        PluginId::parse(raw).unwrap()
    }

    #[test]
    fn path_layout_nests_scoped_packages() {
        let backend = FsBackend {
            root: PathBuf::from("/srv/settings"),
        };
        assert_eq!(
            backend.path_for(&id("@jupyterlab/apputils-extension:themes")),
            PathBuf::from("/srv/settings/@jupyterlab/apputils-extension/themes.knob-settings")
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path().join("settings")).unwrap();
        let key = id("@scope/pkg:plugin");

        assert_eq!(backend.read(&key).unwrap(), None);
        backend.write(&key, b"first").unwrap();
        backend.write(&key, b"second").unwrap();
        assert_eq!(backend.read(&key).unwrap(), Some(b"second".to_vec()));
        assert!(backend.exists(&key).unwrap());
    }

    #[test]
    fn keys_lists_written_ids_only() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        backend.write(&id("@scope/pkg:b"), b"{}").unwrap();
        backend.write(&id("plain:a"), b"{}").unwrap();
        fs::write(dir.path().join("plain/notes.txt"), "ignored").unwrap();

        assert_eq!(backend.keys().unwrap(), vec![id("@scope/pkg:b"), id("plain:a")]);
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        backend.write(&id("pkg:plugin"), b"{}").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path().join("pkg"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["plugin.knob-settings".to_string()]);
    }
}

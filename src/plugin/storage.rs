//! Per-plugin file storage
//!
//! Each plugin gets an isolated directory under `<data_dir>/storage/<name>/`.
//! Handles are created once per name and owned by the cache; callers hold
//! cloned `Arc`s.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Cache of per-plugin storage handles, keyed by plugin name.
#[derive(Debug)]
pub struct StorageCache {
    base: PathBuf,
    handles: RwLock<HashMap<String, Arc<PluginStorage>>>,
}

impl StorageCache {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Get (or create) the storage handle for `plugin_name`. The plugin's
    /// directory is created on first use.
    pub fn storage(&self, plugin_name: &str) -> io::Result<Arc<PluginStorage>> {
        if let Some(handle) = self
            .handles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(plugin_name)
        {
            return Ok(Arc::clone(handle));
        }

        let mut handles = self
            .handles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Re-check: another caller may have created it between the locks.
        if let Some(handle) = handles.get(plugin_name) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(PluginStorage::create(self.base.join(plugin_name))?);
        handles.insert(plugin_name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}

/// Storage rooted at a single plugin's directory.
#[derive(Debug)]
pub struct PluginStorage {
    dir: PathBuf,
}

impl PluginStorage {
    fn create(dir: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of `file_name` inside the plugin's directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.file_path(file_name).exists()
    }

    pub fn delete_file(&self, file_name: &str) -> io::Result<()> {
        std::fs::remove_file(self.file_path(file_name))
    }

    /// Create (if needed) and return a subdirectory of the plugin's storage.
    pub fn create_dir(&self, dir_name: &str) -> io::Result<PathBuf> {
        let dir = self.dir.join(dir_name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StorageCache::new(dir.path());

        let first = cache.storage("alpha").unwrap();
        let second = cache.storage("alpha").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.dir().is_dir());
    }

    #[test]
    fn test_plugins_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StorageCache::new(dir.path());

        let alpha = cache.storage("alpha").unwrap();
        let beta = cache.storage("beta").unwrap();
        assert_ne!(alpha.dir(), beta.dir());
    }

    #[test]
    fn test_file_operations() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StorageCache::new(dir.path());
        let storage = cache.storage("alpha").unwrap();

        std::fs::write(storage.file_path("state.json"), b"{}").unwrap();
        assert!(storage.exists("state.json"));

        storage.delete_file("state.json").unwrap();
        assert!(!storage.exists("state.json"));

        let sub = storage.create_dir("cache").unwrap();
        assert!(sub.is_dir());
    }
}

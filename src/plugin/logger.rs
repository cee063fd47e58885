//! Per-plugin log files
//!
//! Append-only log files under `<data_dir>/logs/<name>/<name>.log`, one per
//! plugin, so a plugin's output can be inspected in isolation. Errors are
//! mirrored to the global log facade. Handles follow the same keyed-cache
//! ownership model as `plugin::storage`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[derive(Debug)]
pub struct PluginLogCache {
    base: PathBuf,
    handles: RwLock<HashMap<String, Arc<PluginLog>>>,
}

impl PluginLogCache {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Get (or create) the log handle for `plugin_name`.
    pub fn logger(&self, plugin_name: &str) -> io::Result<Arc<PluginLog>> {
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
        if let Some(handle) = handles.get(plugin_name) {
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(PluginLog::create(&self.base, plugin_name)?);
        handles.insert(plugin_name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}

/// Append-only log file for a single plugin.
#[derive(Debug)]
pub struct PluginLog {
    plugin_name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl PluginLog {
    fn create(base: &Path, plugin_name: &str) -> io::Result<Self> {
        let dir = base.join(plugin_name);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.log", plugin_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            plugin_name: plugin_name.to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn debug(&self, message: &str) {
        self.write("DEBUG", message);
    }

    pub fn info(&self, message: &str) {
        self.write("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.write("WARN", message);
    }

    /// Errors also go to the service log so they are not buried in a
    /// per-plugin file nobody is watching.
    pub fn error(&self, message: &str) {
        self.write("ERROR", message);
        log::error!("[plugin {}] {}", self.plugin_name, message);
    }

    fn write(&self, level: &str, message: &str) {
        let line = format!(
            "{} [{}] {} - {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            self.plugin_name,
            message
        );
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.write_all(line.as_bytes()) {
            log::warn!(
                "Failed to write log line for plugin '{}': {}",
                self.plugin_name,
                e
            );
        }
    }
}

//! Plugin lifecycle manager
//!
//! Operator-facing operations over the plugin runtime: resolving artifact
//! paths, enforcing preconditions and upload rules, and delegating lifecycle
//! transitions. The manager never touches registry internals; every mutation
//! goes through the `PluginRuntime` interface.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::logger::PluginLogCache;
use crate::plugin::traits::PluginRuntime;
use crate::plugin::types::{
    artifact_file_name, PluginDescriptor, PluginState, MAX_UPLOAD_SIZE, PLUGIN_FILE_EXTENSION,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct PluginManager {
    runtime: Arc<dyn PluginRuntime>,
    plugins_dir: PathBuf,
    logs: Arc<PluginLogCache>,
}

impl PluginManager {
    pub fn new(
        runtime: Arc<dyn PluginRuntime>,
        plugins_dir: impl Into<PathBuf>,
        logs: Arc<PluginLogCache>,
    ) -> Self {
        Self {
            runtime,
            plugins_dir: plugins_dir.into(),
            logs,
        }
    }

    pub fn plugins_dir(&self) -> &PathBuf {
        &self.plugins_dir
    }

    /// Load the plugin whose artifact is `<plugins_dir>/<id>.jar`.
    ///
    /// Loading an already-loaded plugin is a no-op returning the existing
    /// descriptor.
    pub async fn load_plugin(&self, plugin_id: &str) -> PluginResult<PluginDescriptor> {
        require_plugin_id(plugin_id)?;

        if let Some(existing) = self.runtime.get(plugin_id).await {
            log::debug!("Plugin already loaded: {}", plugin_id);
            return Ok(existing);
        }

        let path = self.plugins_dir.join(artifact_file_name(plugin_id));
        if !path.exists() {
            return Err(PluginError::InvalidArtifact {
                path: path.display().to_string(),
                cause: "artifact file does not exist".to_string(),
            });
        }

        let loaded_id = self.runtime.load(&path).await?;
        self.audit(&loaded_id, "plugin loaded");
        self.runtime
            .get(&loaded_id)
            .await
            .ok_or(PluginError::NotFound {
                plugin_id: loaded_id,
            })
    }

    /// Stop and unload a plugin, leaving its artifact on disk.
    pub async fn unload_plugin(&self, plugin_id: &str) -> PluginResult<()> {
        let descriptor = self.require_loaded(plugin_id).await?;

        if descriptor.state == PluginState::Started {
            if let Err(e) = self.runtime.stop(plugin_id).await {
                log::warn!("Failed to stop plugin '{}' before unload: {}", plugin_id, e);
            }
        }

        if self.runtime.unload(plugin_id).await? {
            self.audit(plugin_id, "plugin unloaded");
            Ok(())
        } else {
            Err(PluginError::OperationFailed {
                plugin_id: plugin_id.to_string(),
                operation: "unload".to_string(),
            })
        }
    }

    pub async fn start_plugin(&self, plugin_id: &str) -> PluginResult<PluginState> {
        let descriptor = self.require_loaded(plugin_id).await?;

        if descriptor.state == PluginState::Started {
            log::debug!("Plugin already started: {}", plugin_id);
            return Ok(PluginState::Started);
        }

        let state = self.runtime.start(plugin_id).await?;
        self.audit(plugin_id, "plugin started");
        Ok(state)
    }

    pub async fn stop_plugin(&self, plugin_id: &str) -> PluginResult<PluginState> {
        self.require_loaded(plugin_id).await?;
        let state = self.runtime.stop(plugin_id).await?;
        self.audit(plugin_id, "plugin stopped");
        Ok(state)
    }

    pub async fn enable_plugin(&self, plugin_id: &str) -> PluginResult<()> {
        self.require_loaded(plugin_id).await?;

        if self.runtime.enable(plugin_id).await? {
            self.audit(plugin_id, "plugin enabled");
            Ok(())
        } else {
            Err(PluginError::OperationFailed {
                plugin_id: plugin_id.to_string(),
                operation: "enable".to_string(),
            })
        }
    }

    /// Stop (when running) and gate the plugin against future starts.
    pub async fn disable_plugin(&self, plugin_id: &str) -> PluginResult<()> {
        let descriptor = self.require_loaded(plugin_id).await?;

        if descriptor.state == PluginState::Started {
            if let Err(e) = self.runtime.stop(plugin_id).await {
                log::warn!(
                    "Failed to stop plugin '{}' before disabling: {}",
                    plugin_id,
                    e
                );
            }
        }

        if self.runtime.disable(plugin_id).await? {
            self.audit(plugin_id, "plugin disabled");
            Ok(())
        } else {
            Err(PluginError::OperationFailed {
                plugin_id: plugin_id.to_string(),
                operation: "disable".to_string(),
            })
        }
    }

    /// Unload the plugin and remove its artifact from the plugins directory.
    pub async fn delete_plugin(&self, plugin_id: &str) -> PluginResult<()> {
        self.require_loaded(plugin_id).await?;

        if self.runtime.delete(plugin_id).await? {
            self.audit(plugin_id, "plugin deleted");
            Ok(())
        } else {
            Err(PluginError::OperationFailed {
                plugin_id: plugin_id.to_string(),
                operation: "delete".to_string(),
            })
        }
    }

    pub async fn list_plugins(&self) -> Vec<PluginDescriptor> {
        self.runtime.list().await
    }

    /// Unload every plugin, rescan the plugins directory, and load and start
    /// whatever artifacts are there. Returns the number of plugins loaded.
    ///
    /// Artifacts the runtime rejects are skipped with a warning so one broken
    /// file cannot block the rest of the set.
    pub async fn reload_plugins(&self) -> PluginResult<usize> {
        for descriptor in self.runtime.list().await {
            if let Err(e) = self.runtime.unload(&descriptor.id).await {
                log::warn!(
                    "Failed to unload plugin '{}' during reload: {}",
                    descriptor.id,
                    e
                );
            }
        }

        tokio::fs::create_dir_all(&self.plugins_dir).await?;

        let mut loaded = 0usize;
        let mut entries = tokio::fs::read_dir(&self.plugins_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_artifact = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.to_lowercase().ends_with(PLUGIN_FILE_EXTENSION))
                .unwrap_or(false);
            if !is_artifact {
                continue;
            }

            match self.runtime.load(&path).await {
                Ok(plugin_id) => {
                    if let Err(e) = self.runtime.start(&plugin_id).await {
                        log::warn!("Plugin '{}' reloaded but failed to start: {}", plugin_id, e);
                    }
                    self.audit(&plugin_id, "plugin reloaded");
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("Skipping artifact {} during reload: {}", path.display(), e);
                }
            }
        }

        log::info!("Reloaded {} plugin(s)", loaded);
        Ok(loaded)
    }

    /// Store an uploaded artifact in the plugins directory.
    ///
    /// The file name must be a bare `.jar` name; uploads never overwrite an
    /// existing artifact.
    pub async fn upload_plugin(&self, file_name: &str, data: &[u8]) -> PluginResult<PathBuf> {
        if file_name.is_empty() {
            return Err(PluginError::InvalidUpload {
                message: "file name must not be empty".to_string(),
            });
        }
        if file_name.contains('/') || file_name.contains('\\') {
            return Err(PluginError::InvalidUpload {
                message: "file name must not contain path separators".to_string(),
            });
        }
        if !file_name.to_lowercase().ends_with(PLUGIN_FILE_EXTENSION) {
            return Err(PluginError::InvalidUpload {
                message: format!("only {} artifacts are accepted", PLUGIN_FILE_EXTENSION),
            });
        }
        if data.is_empty() {
            return Err(PluginError::InvalidUpload {
                message: "uploaded file is empty".to_string(),
            });
        }
        if data.len() > MAX_UPLOAD_SIZE {
            return Err(PluginError::InvalidUpload {
                message: format!(
                    "uploaded file exceeds the {} MiB limit",
                    MAX_UPLOAD_SIZE / (1024 * 1024)
                ),
            });
        }

        tokio::fs::create_dir_all(&self.plugins_dir).await?;

        let target = self.plugins_dir.join(file_name);
        if target.exists() {
            return Err(PluginError::InvalidUpload {
                message: format!("a file named '{}' already exists", file_name),
            });
        }

        tokio::fs::write(&target, data).await?;
        log::info!("Plugin artifact uploaded: {}", target.display());
        Ok(target)
    }

    /// Record a lifecycle event in the plugin's own log file.
    fn audit(&self, plugin_id: &str, message: &str) {
        match self.logs.logger(plugin_id) {
            Ok(plugin_log) => plugin_log.info(message),
            Err(e) => log::debug!("No plugin log for '{}': {}", plugin_id, e),
        }
    }

    async fn require_loaded(&self, plugin_id: &str) -> PluginResult<PluginDescriptor> {
        require_plugin_id(plugin_id)?;
        self.runtime
            .get(plugin_id)
            .await
            .ok_or(PluginError::NotFound {
                plugin_id: plugin_id.to_string(),
            })
    }
}

fn require_plugin_id(plugin_id: &str) -> PluginResult<()> {
    if plugin_id.is_empty() {
        return Err(PluginError::EmptyPluginId);
    }
    Ok(())
}

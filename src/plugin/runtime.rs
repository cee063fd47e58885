//! Registry-backed host runtime
//!
//! The concrete `PluginRuntime` used by the service. It validates an artifact
//! by reading the JSON descriptor embedded in the file (`{"id", "version"}`),
//! registers the plugin, and tracks lifecycle state. No plugin code is
//! executed; execution engines plug in behind the same trait.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::registry::SharedPluginRegistry;
use crate::plugin::traits::PluginRuntime;
use crate::plugin::types::{PluginDescriptor, PluginState};
use serde::Deserialize;
use std::path::Path;

/// Descriptor every artifact must carry to be accepted by the host runtime.
#[derive(Debug, Deserialize)]
struct ArtifactDescriptor {
    id: String,
    version: String,
}

/// In-process plugin runtime backed by the shared registry.
#[derive(Debug, Clone, Default)]
pub struct HostRuntime {
    registry: SharedPluginRegistry,
}

impl HostRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SharedPluginRegistry {
        &self.registry
    }

    async fn read_descriptor(path: &Path) -> PluginResult<ArtifactDescriptor> {
        let bytes = tokio::fs::read(path).await?;
        let descriptor: ArtifactDescriptor =
            serde_json::from_slice(&bytes).map_err(|e| PluginError::InvalidArtifact {
                path: path.display().to_string(),
                cause: format!("missing or malformed artifact descriptor: {}", e),
            })?;

        if descriptor.id.is_empty() {
            return Err(PluginError::InvalidArtifact {
                path: path.display().to_string(),
                cause: "artifact descriptor declares an empty id".to_string(),
            });
        }
        if descriptor.version.is_empty() {
            return Err(PluginError::InvalidArtifact {
                path: path.display().to_string(),
                cause: "artifact descriptor declares an empty version".to_string(),
            });
        }

        Ok(descriptor)
    }
}

#[async_trait::async_trait]
impl PluginRuntime for HostRuntime {
    async fn load(&self, path: &Path) -> PluginResult<String> {
        let descriptor = Self::read_descriptor(path).await?;
        let plugin_id = descriptor.id.clone();

        self.registry.inner().write().await.register(PluginDescriptor {
            id: descriptor.id,
            version: descriptor.version,
            path: path.to_path_buf(),
            state: PluginState::Created,
        })?;

        log::info!("Plugin loaded: {} ({})", plugin_id, path.display());
        Ok(plugin_id)
    }

    async fn unload(&self, plugin_id: &str) -> PluginResult<bool> {
        match self.registry.inner().write().await.remove(plugin_id) {
            Some(_) => {
                log::info!("Plugin unloaded: {}", plugin_id);
                Ok(true)
            }
            None => Err(PluginError::NotFound {
                plugin_id: plugin_id.to_string(),
            }),
        }
    }

    async fn start(&self, plugin_id: &str) -> PluginResult<PluginState> {
        let mut registry = self.registry.inner().write().await;
        let current = registry
            .get(plugin_id)
            .map(|descriptor| descriptor.state)
            .ok_or_else(|| PluginError::NotFound {
                plugin_id: plugin_id.to_string(),
            })?;

        if current == PluginState::Disabled {
            return Err(PluginError::Disabled {
                plugin_id: plugin_id.to_string(),
            });
        }

        registry.set_state(plugin_id, PluginState::Started)
    }

    async fn stop(&self, plugin_id: &str) -> PluginResult<PluginState> {
        self.registry
            .inner()
            .write()
            .await
            .set_state(plugin_id, PluginState::Stopped)
    }

    async fn enable(&self, plugin_id: &str) -> PluginResult<bool> {
        let mut registry = self.registry.inner().write().await;
        let current = registry
            .get(plugin_id)
            .map(|descriptor| descriptor.state)
            .ok_or_else(|| PluginError::NotFound {
                plugin_id: plugin_id.to_string(),
            })?;

        if current == PluginState::Disabled {
            registry.set_state(plugin_id, PluginState::Created)?;
        }
        Ok(true)
    }

    async fn disable(&self, plugin_id: &str) -> PluginResult<bool> {
        self.registry
            .inner()
            .write()
            .await
            .set_state(plugin_id, PluginState::Disabled)?;
        Ok(true)
    }

    async fn delete(&self, plugin_id: &str) -> PluginResult<bool> {
        let descriptor = match self.registry.inner().write().await.remove(plugin_id) {
            Some(descriptor) => descriptor,
            None => {
                return Err(PluginError::NotFound {
                    plugin_id: plugin_id.to_string(),
                })
            }
        };

        match tokio::fs::remove_file(&descriptor.path).await {
            Ok(()) => {}
            // Registry entry without a backing file; deletion already done.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        log::info!("Plugin deleted: {}", plugin_id);
        Ok(true)
    }

    async fn get(&self, plugin_id: &str) -> Option<PluginDescriptor> {
        self.registry.get(plugin_id).await
    }

    async fn list(&self) -> Vec<PluginDescriptor> {
        self.registry.list().await
    }
}

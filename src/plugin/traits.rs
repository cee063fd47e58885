//! Runtime interface for hosted plugins
//!
//! The engine that actually executes plugin code is an external collaborator;
//! this trait is the contract the rest of the service programs against. The
//! in-process implementation is `HostRuntime`, which validates and tracks
//! artifacts without executing them.

use crate::plugin::error::PluginResult;
use crate::plugin::types::{PluginDescriptor, PluginState};
use std::path::Path;

#[async_trait::async_trait]
pub trait PluginRuntime: Send + Sync {
    /// Load the artifact at `path`, returning the plugin id it declares.
    ///
    /// Fails when the artifact is rejected or a plugin with the same id is
    /// already loaded.
    async fn load(&self, path: &Path) -> PluginResult<String>;

    /// Remove a loaded plugin from the runtime registry. The artifact file is
    /// left in place.
    async fn unload(&self, plugin_id: &str) -> PluginResult<bool>;

    async fn start(&self, plugin_id: &str) -> PluginResult<PluginState>;

    async fn stop(&self, plugin_id: &str) -> PluginResult<PluginState>;

    /// Lift a disable gate; the plugin returns to `Created` and may be
    /// started again.
    async fn enable(&self, plugin_id: &str) -> PluginResult<bool>;

    /// Stop the plugin (if running) and gate it against future starts.
    async fn disable(&self, plugin_id: &str) -> PluginResult<bool>;

    /// Unload the plugin and delete its artifact from disk.
    async fn delete(&self, plugin_id: &str) -> PluginResult<bool>;

    async fn get(&self, plugin_id: &str) -> Option<PluginDescriptor>;

    async fn list(&self) -> Vec<PluginDescriptor>;
}

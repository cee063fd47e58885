//! Plugin Registry
//!
//! Thread-safe registry of installed plugin descriptors. The runtime owns the
//! only mutable access; consumers read through cloned snapshots.

use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::types::{PluginDescriptor, PluginState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry of installed plugins, keyed by plugin id.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    descriptors: HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; fails when the id is already present.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> PluginResult<()> {
        if self.descriptors.contains_key(&descriptor.id) {
            return Err(PluginError::AlreadyLoaded {
                plugin_id: descriptor.id,
            });
        }
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    /// Remove a descriptor, returning it when present.
    pub fn remove(&mut self, plugin_id: &str) -> Option<PluginDescriptor> {
        self.descriptors.remove(plugin_id)
    }

    pub fn get(&self, plugin_id: &str) -> Option<&PluginDescriptor> {
        self.descriptors.get(plugin_id)
    }

    /// Update the lifecycle state of a registered plugin.
    pub fn set_state(&mut self, plugin_id: &str, state: PluginState) -> PluginResult<PluginState> {
        match self.descriptors.get_mut(plugin_id) {
            Some(descriptor) => {
                descriptor.state = state;
                Ok(state)
            }
            None => Err(PluginError::NotFound {
                plugin_id: plugin_id.to_string(),
            }),
        }
    }

    pub fn contains(&self, plugin_id: &str) -> bool {
        self.descriptors.contains_key(plugin_id)
    }

    pub fn list(&self) -> Vec<PluginDescriptor> {
        let mut descriptors: Vec<_> = self.descriptors.values().cloned().collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Shared handle to the registry for concurrent access.
#[derive(Debug, Clone, Default)]
pub struct SharedPluginRegistry {
    inner: Arc<RwLock<PluginRegistry>>,
}

impl SharedPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &Arc<RwLock<PluginRegistry>> {
        &self.inner
    }

    pub async fn get(&self, plugin_id: &str) -> Option<PluginDescriptor> {
        self.inner.read().await.get(plugin_id).cloned()
    }

    pub async fn contains(&self, plugin_id: &str) -> bool {
        self.inner.read().await.contains(plugin_id)
    }

    pub async fn list(&self) -> Vec<PluginDescriptor> {
        self.inner.read().await.list()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn descriptor(id: &str) -> PluginDescriptor {
        PluginDescriptor {
            id: id.to_string(),
            version: "1.0.0".to_string(),
            path: PathBuf::from(format!("/plugins/{}.jar", id)),
            state: PluginState::Created,
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = PluginRegistry::new();
        registry.register(descriptor("alpha")).unwrap();

        assert!(registry.contains("alpha"));
        assert_eq!(registry.get("alpha").unwrap().version, "1.0.0");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = PluginRegistry::new();
        registry.register(descriptor("alpha")).unwrap();

        let result = registry.register(descriptor("alpha"));
        assert!(matches!(
            result,
            Err(PluginError::AlreadyLoaded { plugin_id }) if plugin_id == "alpha"
        ));
    }

    #[test]
    fn test_set_state() {
        let mut registry = PluginRegistry::new();
        registry.register(descriptor("alpha")).unwrap();

        let state = registry.set_state("alpha", PluginState::Started).unwrap();
        assert_eq!(state, PluginState::Started);
        assert_eq!(registry.get("alpha").unwrap().state, PluginState::Started);

        assert!(matches!(
            registry.set_state("missing", PluginState::Started),
            Err(PluginError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_is_sorted_by_id() {
        let mut registry = PluginRegistry::new();
        registry.register(descriptor("zeta")).unwrap();
        registry.register(descriptor("alpha")).unwrap();

        let ids: Vec<_> = registry.list().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_shared_registry_access() {
        let shared = SharedPluginRegistry::new();
        assert_eq!(shared.len().await, 0);

        shared
            .inner()
            .write()
            .await
            .register(descriptor("alpha"))
            .unwrap();

        assert!(shared.contains("alpha").await);
        assert_eq!(shared.list().await.len(), 1);
    }
}

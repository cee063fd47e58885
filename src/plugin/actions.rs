//! Action dispatch
//!
//! Explicit mapping from action-name strings to handler closures, built at
//! startup. Plugins (and the host itself) register named operations; the
//! `/ext` routes dispatch into this table. There is no runtime introspection:
//! an action exists if and only if something registered it.

use crate::plugin::error::{PluginError, PluginResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Handler invoked with the request's `parameters` object.
pub type ActionHandler = Arc<dyn Fn(&Value) -> PluginResult<Value> + Send + Sync>;

/// Name-to-handler table for dispatchable actions.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: RwLock<HashMap<String, ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`; duplicate names are rejected.
    pub fn register<F>(&self, name: impl Into<String>, handler: F) -> PluginResult<()>
    where
        F: Fn(&Value) -> PluginResult<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(&name) {
            return Err(PluginError::ActionFailed {
                action: name,
                cause: "an action with this name is already registered".to_string(),
            });
        }
        handlers.insert(name, Arc::new(handler));
        Ok(())
    }

    /// Remove a handler, e.g. when its plugin is unloaded.
    pub fn unregister(&self, name: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    /// Dispatch `parameters` to the handler registered under `name`.
    pub fn dispatch(&self, name: &str, parameters: &Value) -> PluginResult<Value> {
        let handler = {
            let handlers = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(name)
                .cloned()
                .ok_or_else(|| PluginError::ActionNotFound {
                    action: name.to_string(),
                })?
        };
        handler(parameters)
    }

    /// Names of all registered actions, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

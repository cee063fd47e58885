//! Public API for the plugin domain
//!
//! External modules should import from here rather than directly from the
//! internal modules.

pub use crate::plugin::actions::{ActionHandler, ActionRegistry};
pub use crate::plugin::error::{PluginError, PluginResult};
pub use crate::plugin::logger::{PluginLog, PluginLogCache};
pub use crate::plugin::manager::PluginManager;
pub use crate::plugin::registry::{PluginRegistry, SharedPluginRegistry};
pub use crate::plugin::runtime::HostRuntime;
pub use crate::plugin::storage::{PluginStorage, StorageCache};
pub use crate::plugin::traits::PluginRuntime;
pub use crate::plugin::types::{
    artifact_file_name, PluginDescriptor, PluginState, MAX_UPLOAD_SIZE, PLUGIN_FILE_EXTENSION,
    TMP_SUFFIX,
};

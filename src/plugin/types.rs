//! Type definitions for the plugin domain
//!
//! Data structures shared between the runtime, the lifecycle manager and the
//! update orchestrator, plus the artifact file conventions.

use serde::Serialize;
use std::path::PathBuf;

/// File extension required for plugin artifacts.
pub const PLUGIN_FILE_EXTENSION: &str = ".jar";

/// Suffix appended to in-flight download targets next to the final artifact.
pub const TMP_SUFFIX: &str = ".tmp";

/// Upper bound for uploaded artifact size (100 MiB).
pub const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Lifecycle state of a locally installed plugin.
///
/// `Created` is the post-load resting state; `Disabled` plugins stay loaded
/// but refuse to start until enabled again.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginState {
    Created,
    Started,
    Stopped,
    Disabled,
}

/// Descriptor of a locally installed plugin.
///
/// Owned and mutated exclusively by the runtime; everyone else gets clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    pub id: String,
    pub version: String,
    pub path: PathBuf,
    pub state: PluginState,
}

/// Build the artifact file name for a plugin id.
pub fn artifact_file_name(plugin_id: &str) -> String {
    format!("{}{}", plugin_id, PLUGIN_FILE_EXTENSION)
}

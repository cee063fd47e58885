//! Plugin lifecycle error types

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin not found: {plugin_id}")]
    NotFound { plugin_id: String },

    #[error("plugin '{plugin_id}' is already loaded")]
    AlreadyLoaded { plugin_id: String },

    #[error("plugin id must not be empty")]
    EmptyPluginId,

    #[error("artifact rejected ({path}): {cause}")]
    InvalidArtifact { path: String, cause: String },

    #[error("plugin '{plugin_id}' is disabled")]
    Disabled { plugin_id: String },

    #[error("operation '{operation}' failed for plugin '{plugin_id}'")]
    OperationFailed {
        plugin_id: String,
        operation: String,
    },

    #[error("invalid upload: {message}")]
    InvalidUpload { message: String },

    #[error("action not registered: {action}")]
    ActionNotFound { action: String },

    #[error("action '{action}' failed: {cause}")]
    ActionFailed { action: String, cause: String },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Stable code surfaced in the HTTP envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            PluginError::NotFound { .. } | PluginError::ActionNotFound { .. } => "NOT_FOUND",
            PluginError::AlreadyLoaded { .. }
            | PluginError::EmptyPluginId
            | PluginError::InvalidUpload { .. } => "INVALID_ARGUMENT",
            PluginError::InvalidArtifact { .. } => "LOAD_ERROR",
            PluginError::Disabled { .. }
            | PluginError::OperationFailed { .. }
            | PluginError::ActionFailed { .. } => "OPERATION_FAILED",
            PluginError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for plugin operations
pub type PluginResult<T> = Result<T, PluginError>;

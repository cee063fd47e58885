//! Update Error Types
//!
//! Two layers: `FetchError` describes one failed network attempt (and decides
//! retryability); `UpdateError` is the taxonomy surfaced by the update
//! subsystem's public operations.

use crate::core::version::VersionError;

/// Failure of a single download attempt.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out ({url})")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request failed ({url}): {cause}")]
    Network { url: String, cause: String },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Only timeouts are worth another attempt; everything else is a
    /// deterministic failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("no plugin repository is configured")]
    RepositoryNotConfigured,

    #[error("{message}")]
    InvalidArgument { message: String },

    #[error("plugin is not installed: {plugin_id}")]
    PluginNotFound { plugin_id: String },

    #[error("plugin '{plugin_id}' is already installed; use update instead")]
    AlreadyInstalled { plugin_id: String },

    #[error("plugin not found in repository: {plugin_id}")]
    NotInRepository { plugin_id: String },

    #[error("download failed ({url}): {source}")]
    DownloadFailed { url: String, source: FetchError },

    #[error("malformed plugin manifest: {cause}")]
    ManifestParse { cause: String },

    #[error("invalid version: {0}")]
    Version(#[from] VersionError),

    #[error(
        "artifact checksum mismatch for '{plugin_id}', the file may be corrupted \
         (expected {expected}, got {actual})"
    )]
    Integrity {
        plugin_id: String,
        expected: String,
        actual: String,
    },

    #[error("runtime rejected the artifact for '{plugin_id}': {cause}")]
    LoadRejected { plugin_id: String, cause: String },

    #[error("network client error: {cause}")]
    Network { cause: String },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl UpdateError {
    /// Stable code surfaced in the HTTP envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            UpdateError::RepositoryNotConfigured => "CONFIG_ERROR",
            UpdateError::InvalidArgument { .. } | UpdateError::AlreadyInstalled { .. } => {
                "INVALID_ARGUMENT"
            }
            UpdateError::PluginNotFound { .. } | UpdateError::NotInRepository { .. } => {
                "NOT_FOUND"
            }
            UpdateError::DownloadFailed { .. } | UpdateError::Network { .. } => "NETWORK_ERROR",
            UpdateError::ManifestParse { .. } | UpdateError::Version(_) => "PARSE_ERROR",
            UpdateError::Integrity { .. } => "INTEGRITY_ERROR",
            UpdateError::LoadRejected { .. } => "LOAD_ERROR",
            UpdateError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for update operations
pub type UpdateResult<T> = Result<T, UpdateError>;

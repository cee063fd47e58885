//! Public API for the update subsystem
//!
//! External modules should import from here rather than directly from the
//! internal modules.

pub use crate::update::error::{FetchError, UpdateError, UpdateResult};
pub use crate::update::fetcher::{sha512_file, ArtifactFetcher, CONNECT_TIMEOUT, READ_TIMEOUT};
pub use crate::update::manifest::{
    ManifestClient, RemoteManifest, RemotePluginEntry, MANIFEST_FILE,
};
pub use crate::update::orchestrator::{UpdateCheck, UpdateOrchestrator, UpdateOutcome};
pub use crate::update::repository::RepositoryStore;

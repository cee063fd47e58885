//! Shared handler state
//!
//! The object graph built once at startup and handed to every worker through
//! `actix_web::web::Data`.

use crate::core::config::AppConfig;
use crate::plugin::api::{ActionRegistry, PluginManager, StorageCache};
use crate::update::api::{RepositoryStore, UpdateOrchestrator};
use std::sync::Arc;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Arc<RepositoryStore>,
    pub manager: Arc<PluginManager>,
    pub orchestrator: Arc<UpdateOrchestrator>,
    pub actions: Arc<ActionRegistry>,
    /// Per-plugin file storage root, handed to plugin-provided actions.
    pub storage: Arc<StorageCache>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::config::DEFAULT_LISTEN;
    use crate::core::retry::RetryPolicy;
    use crate::plugin::api::{HostRuntime, PluginLogCache};
    use crate::update::api::{ArtifactFetcher, ManifestClient};
    use std::path::Path;

    /// Build a fully wired state rooted at a temp directory.
    pub fn state_at(dir: &Path) -> AppState {
        let config = Arc::new(AppConfig {
            listen: DEFAULT_LISTEN.to_string(),
            plugins_dir: dir.join("plugins"),
            data_dir: dir.to_path_buf(),
            log_level: None,
            log_file: None,
        });
        let runtime = Arc::new(HostRuntime::new());
        let repository = Arc::new(RepositoryStore::open(&config.data_dir).unwrap());
        let fetcher = ArtifactFetcher::with_policy(RetryPolicy::default()).unwrap();
        let manifest = ManifestClient::new(Arc::clone(&repository), fetcher.clone());

        AppState {
            config: Arc::clone(&config),
            repository,
            manager: Arc::new(PluginManager::new(
                runtime.clone(),
                &config.plugins_dir,
                Arc::new(PluginLogCache::new(config.data_dir.join("logs"))),
            )),
            orchestrator: Arc::new(UpdateOrchestrator::new(
                runtime,
                manifest,
                fetcher,
                &config.plugins_dir,
            )),
            actions: Arc::new(ActionRegistry::new()),
            storage: Arc::new(StorageCache::new(config.data_dir.join("storage"))),
        }
    }
}

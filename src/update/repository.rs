//! Repository configuration store
//!
//! Persists the single operator-configurable value, the remote plugin
//! repository base URL, as a JSON object under the service's data directory.
//! Every `set` writes through immediately so the value survives restarts.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

const CONFIG_FILE_NAME: &str = "app_config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
struct RepositoryConfig {
    repository_url: Option<String>,
}

/// Durable store for the repository configuration.
#[derive(Debug)]
pub struct RepositoryStore {
    path: PathBuf,
    config: RwLock<RepositoryConfig>,
}

impl RepositoryStore {
    /// Open (or create) the store at `<data_dir>/config/app_config.json`.
    ///
    /// A corrupt config file degrades to an empty configuration with a
    /// warning rather than refusing to start.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        let path = data_dir.join("config").join(CONFIG_FILE_NAME);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Repository config at {} is unreadable ({}), starting empty",
                        path.display(),
                        e
                    );
                    RepositoryConfig::default()
                }
            }
        } else {
            let config = RepositoryConfig::default();
            Self::write(&path, &config)?;
            config
        };

        Ok(Self {
            path,
            config: RwLock::new(config),
        })
    }

    /// Currently configured repository base URL, if any.
    pub fn repository_url(&self) -> Option<String> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .repository_url
            .clone()
    }

    /// Replace the repository URL and persist immediately.
    pub fn set_repository_url(&self, url: &str) -> io::Result<()> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.repository_url = Some(url.to_string());
        Self::write(&self.path, &config)?;
        log::info!("Repository URL updated: {}", url);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(path: &Path, config: &RepositoryConfig) -> io::Result<()> {
        let content = serde_json::to_string_pretty(config).map_err(io::Error::other)?;
        std::fs::write(path, content)
    }
}

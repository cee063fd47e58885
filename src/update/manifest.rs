//! Remote Manifest Client
//!
//! Fetches and interprets the repository's `plugins.json`. The manifest is
//! re-fetched on every check, never cached, so an operator pushing a new
//! release does not have to wait out a TTL.

use crate::update::error::{UpdateError, UpdateResult};
use crate::update::fetcher::ArtifactFetcher;
use crate::update::repository::RepositoryStore;
use serde::Deserialize;
use std::sync::Arc;

/// Manifest file name resolved against the repository base URL.
pub const MANIFEST_FILE: &str = "plugins.json";

/// One plugin release advertised by the repository.
///
/// `jar_url` and `sha512` are optional: a missing URL is synthesized from the
/// repository base, a missing checksum skips integrity verification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePluginEntry {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub jar_url: Option<String>,
    #[serde(default)]
    pub sha512: Option<String>,
}

/// The full remote manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteManifest {
    #[serde(default)]
    pub plugins: Vec<RemotePluginEntry>,
}

/// Client resolving plugin metadata against the configured repository.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    store: Arc<RepositoryStore>,
    fetcher: ArtifactFetcher,
}

impl ManifestClient {
    pub fn new(store: Arc<RepositoryStore>, fetcher: ArtifactFetcher) -> Self {
        Self { store, fetcher }
    }

    /// Configured repository base URL, normalized to end with `/`.
    pub fn repository_base(&self) -> UpdateResult<String> {
        let url = self
            .store
            .repository_url()
            .filter(|url| !url.is_empty())
            .ok_or(UpdateError::RepositoryNotConfigured)?;

        if url.ends_with('/') {
            Ok(url)
        } else {
            Ok(format!("{}/", url))
        }
    }

    /// Fetch and parse the repository manifest.
    pub async fn fetch_manifest(&self) -> UpdateResult<RemoteManifest> {
        let url = format!("{}{}", self.repository_base()?, MANIFEST_FILE);
        log::debug!("Fetching plugin manifest: {}", url);

        let content = self.fetcher.download_text(&url).await?;
        serde_json::from_str(&content).map_err(|e| UpdateError::ManifestParse {
            cause: e.to_string(),
        })
    }

    /// Look up a single plugin's entry in the manifest.
    pub async fn fetch_entry(&self, plugin_id: &str) -> UpdateResult<RemotePluginEntry> {
        let manifest = self.fetch_manifest().await?;
        manifest
            .plugins
            .into_iter()
            .find(|entry| entry.id == plugin_id)
            .ok_or_else(|| UpdateError::NotInRepository {
                plugin_id: plugin_id.to_string(),
            })
    }

    /// Resolve the download URL for an entry: the explicit `jarUrl` when
    /// present, otherwise `<repository>/<id>.jar`.
    pub fn artifact_url(&self, entry: &RemotePluginEntry) -> UpdateResult<String> {
        match entry.jar_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => Ok(url.to_string()),
            None => Ok(format!("{}{}.jar", self.repository_base()?, entry.id)),
        }
    }
}

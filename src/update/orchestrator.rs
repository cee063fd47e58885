//! Install/Update Orchestrator
//!
//! Drives one plugin operation end-to-end: manifest lookup, version
//! comparison, artifact download, integrity verification, atomic swap into
//! the plugins directory, and runtime reconciliation (unload old, load new,
//! start). Every failure path cleans up the temp artifact before returning;
//! the final artifact is only touched after the replacement is fully
//! verified. Operations on the same plugin id are mutually exclusive.

use crate::core::sync::KeyedLocks;
use crate::core::version::{compare_versions, is_newer};
use crate::plugin::api::{artifact_file_name, PluginDescriptor, PluginRuntime, TMP_SUFFIX};
use crate::update::error::{UpdateError, UpdateResult};
use crate::update::fetcher::{sha512_file, ArtifactFetcher};
use crate::update::manifest::{ManifestClient, RemotePluginEntry};
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a version check against the repository.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheck {
    pub plugin_id: String,
    pub local_version: String,
    pub remote_version: String,
    pub has_update: bool,
}

/// Terminal result of an install/update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Installed { plugin_id: String, version: String },
    Updated { plugin_id: String, version: String },
    AlreadyLatest { plugin_id: String, version: String },
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOutcome::Installed { plugin_id, version } => {
                write!(
                    f,
                    "plugin '{}' installed successfully, version {}",
                    plugin_id, version
                )
            }
            UpdateOutcome::Updated { plugin_id, version } => {
                write!(
                    f,
                    "plugin '{}' updated successfully, version {}",
                    plugin_id, version
                )
            }
            UpdateOutcome::AlreadyLatest { plugin_id, version } => {
                write!(
                    f,
                    "plugin '{}' is already latest (version {}), no update needed",
                    plugin_id, version
                )
            }
        }
    }
}

pub struct UpdateOrchestrator {
    runtime: Arc<dyn PluginRuntime>,
    manifest: ManifestClient,
    fetcher: ArtifactFetcher,
    plugins_dir: PathBuf,
    locks: KeyedLocks,
}

impl UpdateOrchestrator {
    pub fn new(
        runtime: Arc<dyn PluginRuntime>,
        manifest: ManifestClient,
        fetcher: ArtifactFetcher,
        plugins_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime,
            manifest,
            fetcher,
            plugins_dir: plugins_dir.into(),
            locks: KeyedLocks::new(),
        }
    }

    /// Compare the installed version of `plugin_id` against the repository.
    pub async fn check_for_update(&self, plugin_id: &str) -> UpdateResult<UpdateCheck> {
        require_plugin_id(plugin_id)?;

        let local = self.require_installed(plugin_id).await?;
        let remote = self.manifest.fetch_entry(plugin_id).await?;

        let has_update = is_newer(&remote.version, &local.version)?;
        log::info!(
            "Update check for '{}': local {}, remote {}, update available: {}",
            plugin_id,
            local.version,
            remote.version,
            has_update
        );

        Ok(UpdateCheck {
            plugin_id: plugin_id.to_string(),
            local_version: local.version,
            remote_version: remote.version,
            has_update,
        })
    }

    /// Install a plugin that is not yet present locally.
    pub async fn install_plugin(&self, plugin_id: &str) -> UpdateResult<UpdateOutcome> {
        require_plugin_id(plugin_id)?;
        let _guard = self.locks.acquire(plugin_id).await;

        if self.runtime.get(plugin_id).await.is_some() {
            return Err(UpdateError::AlreadyInstalled {
                plugin_id: plugin_id.to_string(),
            });
        }

        self.perform(plugin_id, None).await
    }

    /// Update a plugin that is already installed.
    pub async fn update_plugin(&self, plugin_id: &str) -> UpdateResult<UpdateOutcome> {
        require_plugin_id(plugin_id)?;
        let _guard = self.locks.acquire(plugin_id).await;

        let existing = self.require_installed(plugin_id).await?;
        self.perform(plugin_id, Some(existing)).await
    }

    /// Install or update, picking the precondition from local presence.
    ///
    /// When installed, an opportunistic version check runs first so an
    /// up-to-date plugin costs one manifest fetch and no artifact download;
    /// a failed remote lookup at this stage is logged and the transactional
    /// path (with its authoritative check) proceeds anyway.
    pub async fn update_or_install_plugin(&self, plugin_id: &str) -> UpdateResult<UpdateOutcome> {
        require_plugin_id(plugin_id)?;
        let _guard = self.locks.acquire(plugin_id).await;

        let existing = self.runtime.get(plugin_id).await;

        if let Some(local) = &existing {
            match self.manifest.fetch_entry(plugin_id).await {
                Ok(remote) => {
                    if let Ok(false) = is_newer(&remote.version, &local.version) {
                        log::info!("Plugin '{}' is already latest, skipping", plugin_id);
                        return Ok(UpdateOutcome::AlreadyLatest {
                            plugin_id: plugin_id.to_string(),
                            version: local.version.clone(),
                        });
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Pre-check for '{}' failed ({}), continuing with the update path",
                        plugin_id,
                        e
                    );
                }
            }
        }

        self.perform(plugin_id, existing).await
    }

    /// The shared transactional path behind install and update.
    ///
    /// Must be called with the plugin's lock held.
    async fn perform(
        &self,
        plugin_id: &str,
        existing: Option<PluginDescriptor>,
    ) -> UpdateResult<UpdateOutcome> {
        log::info!(
            "{} plugin: {}",
            if existing.is_some() {
                "Updating"
            } else {
                "Installing"
            },
            plugin_id
        );

        let remote = self.manifest.fetch_entry(plugin_id).await?;

        // Authoritative version check; the opportunistic one may have run
        // against metadata that changed in the meantime.
        if let Some(local) = &existing {
            if compare_versions(&remote.version, &local.version)? != Ordering::Greater {
                return Ok(UpdateOutcome::AlreadyLatest {
                    plugin_id: plugin_id.to_string(),
                    version: local.version.clone(),
                });
            }
        }

        let download_url = self.manifest.artifact_url(&remote)?;

        tokio::fs::create_dir_all(&self.plugins_dir).await?;
        let file_name = artifact_file_name(plugin_id);
        let final_path = self.plugins_dir.join(&file_name);
        let temp_path = self.plugins_dir.join(format!("{}{}", file_name, TMP_SUFFIX));

        let result = self
            .transact(
                plugin_id,
                existing.as_ref(),
                &remote,
                &download_url,
                &temp_path,
                &final_path,
            )
            .await;

        if result.is_err() {
            remove_if_exists(&temp_path).await;
        }

        match &result {
            Ok(outcome) => log::info!("{}", outcome),
            Err(e) => log::error!(
                "{} of plugin '{}' failed: {}",
                if existing.is_some() { "Update" } else { "Install" },
                plugin_id,
                e
            ),
        }

        result
    }

    async fn transact(
        &self,
        plugin_id: &str,
        existing: Option<&PluginDescriptor>,
        remote: &RemotePluginEntry,
        download_url: &str,
        temp_path: &Path,
        final_path: &Path,
    ) -> UpdateResult<UpdateOutcome> {
        log::info!("Downloading plugin artifact: {}", download_url);
        self.fetcher.download_file(download_url, temp_path).await?;

        match remote.sha512.as_deref().filter(|digest| !digest.is_empty()) {
            Some(expected) => {
                let actual = sha512_file(temp_path).await?;
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(UpdateError::Integrity {
                        plugin_id: plugin_id.to_string(),
                        expected: expected.to_lowercase(),
                        actual,
                    });
                }
                log::info!("Artifact checksum verified for '{}'", plugin_id);
            }
            None => {
                log::warn!(
                    "No checksum published for plugin '{}', integrity verification skipped",
                    plugin_id
                );
            }
        }

        // The replacement is verified; only now is it safe to tear down the
        // old installation.
        if existing.is_some() {
            log::info!("Removing old plugin: {}", plugin_id);
            if let Err(e) = self.runtime.delete(plugin_id).await {
                log::warn!("Failed to remove old plugin '{}': {}", plugin_id, e);
            }
        }

        // Same-directory rename: atomic replacement, never a partially
        // written final artifact.
        tokio::fs::rename(temp_path, final_path).await?;

        let loaded_id = match self.runtime.load(final_path).await {
            Ok(id) => id,
            Err(e) => {
                remove_if_exists(final_path).await;
                return Err(UpdateError::LoadRejected {
                    plugin_id: plugin_id.to_string(),
                    cause: e.to_string(),
                });
            }
        };

        // Start is best-effort: a plugin that loads but will not start is
        // installed, just not running.
        if let Err(e) = self.runtime.start(&loaded_id).await {
            log::warn!("Plugin '{}' loaded but failed to start: {}", loaded_id, e);
        }

        Ok(if existing.is_some() {
            UpdateOutcome::Updated {
                plugin_id: plugin_id.to_string(),
                version: remote.version.clone(),
            }
        } else {
            UpdateOutcome::Installed {
                plugin_id: plugin_id.to_string(),
                version: remote.version.clone(),
            }
        })
    }

    async fn require_installed(&self, plugin_id: &str) -> UpdateResult<PluginDescriptor> {
        self.runtime
            .get(plugin_id)
            .await
            .ok_or_else(|| UpdateError::PluginNotFound {
                plugin_id: plugin_id.to_string(),
            })
    }
}

fn require_plugin_id(plugin_id: &str) -> UpdateResult<()> {
    if plugin_id.is_empty() {
        return Err(UpdateError::InvalidArgument {
            message: "plugin id must not be empty".to_string(),
        });
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

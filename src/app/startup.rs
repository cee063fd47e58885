//! Application startup
//!
//! Staged bring-up: parse CLI flags, resolve configuration, initialize
//! logging, build the service object graph, then run the HTTP server until
//! shutdown.

use crate::app::cli::Args;
use crate::core::config::AppConfig;
use crate::core::logging::init_logging;
use crate::core::retry::RetryPolicy;
use crate::plugin::api::{ActionRegistry, HostRuntime, PluginLogCache, PluginManager, StorageCache};
use crate::server::api::{configure, AppState};
use crate::update::api::{ArtifactFetcher, ManifestClient, RepositoryStore, UpdateOrchestrator};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use clap::Parser;
use std::sync::Arc;

/// Run the service until the server exits.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = Arc::new(AppConfig::load(args.into_overrides())?);

    init_logging(config.log_level.as_deref(), config.log_file.as_deref())?;
    log::info!(
        "plugdepot {} starting (built {}, {})",
        env!("CARGO_PKG_VERSION"),
        crate::build_time(),
        crate::git_hash()
    );
    log::info!(
        "Plugins dir: {}, data dir: {}",
        config.plugins_dir.display(),
        config.data_dir.display()
    );

    tokio::fs::create_dir_all(&config.plugins_dir).await?;
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let state = build_state(Arc::clone(&config))?;
    let data = Data::new(state);

    log::info!("Listening on {}", config.listen);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(config.listen.as_str())?
        .run()
        .await?;

    log::info!("plugdepot stopped");
    Ok(())
}

/// Wire the service object graph from a resolved configuration.
fn build_state(config: Arc<AppConfig>) -> Result<AppState, Box<dyn std::error::Error>> {
    let runtime = Arc::new(HostRuntime::new());
    let repository = Arc::new(RepositoryStore::open(&config.data_dir)?);
    let fetcher = ArtifactFetcher::with_policy(RetryPolicy::default())?;
    let manifest = ManifestClient::new(Arc::clone(&repository), fetcher.clone());

    let plugin_logs = Arc::new(PluginLogCache::new(config.data_dir.join("logs")));
    let manager = Arc::new(PluginManager::new(
        runtime.clone(),
        &config.plugins_dir,
        plugin_logs,
    ));
    let orchestrator = Arc::new(UpdateOrchestrator::new(
        runtime,
        manifest,
        fetcher,
        &config.plugins_dir,
    ));

    let actions = Arc::new(ActionRegistry::new());
    register_host_actions(&actions)?;

    let storage = Arc::new(StorageCache::new(config.data_dir.join("storage")));

    Ok(AppState {
        config,
        repository,
        manager,
        orchestrator,
        actions,
        storage,
    })
}

/// Built-in actions available without any plugin installed.
fn register_host_actions(
    actions: &ActionRegistry,
) -> Result<(), crate::plugin::api::PluginError> {
    actions.register("host.info", |_params| {
        Ok(serde_json::json!({
            "service": "plugdepot",
            "version": env!("CARGO_PKG_VERSION"),
            "buildTime": crate::build_time(),
            "gitHash": crate::git_hash(),
        }))
    })
}

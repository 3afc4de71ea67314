//! Startup orchestration.
//!
//! # Responsibilities
//! - Merge the config file and command line into one settings value
//! - Bind the HTTP listener (fatal on failure)
//! - Start change notification (degrades to disabled on failure)
//! - Run until interrupted
//!
//! # Design Decisions
//! - Fail fast on anything the HTTP side needs
//! - The HTTP listener binds before any watcher or side-channel exists

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_settings, resolve_config, Cli, ConfigError, PreviewSettings, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals;
use crate::reload::{ChangeWatcher, NotifySource, ReloadRegistry, ReloadServer, WatchError, WatchSet};
use crate::render::MarkdownRenderer;

/// Errors that stop the process before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] io::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Settings from `--config` (if any) with command-line values on top.
pub fn collect_settings(cli: &Cli) -> Result<PreviewSettings, StartupError> {
    let file = match &cli.config {
        Some(path) => load_settings(path)?,
        None => PreviewSettings::default(),
    };
    Ok(file.overlay(cli.settings()))
}

/// Validate `settings` against the current working directory.
pub fn resolve(settings: &PreviewSettings) -> Result<ServerConfig, StartupError> {
    let cwd = std::env::current_dir().map_err(StartupError::WorkingDir)?;
    Ok(resolve_config(settings, &cwd)?)
}

/// Running change notification: the side-channel port and the watcher
/// keeping it fed.
pub struct LiveReload {
    port: u16,
    _watcher: ChangeWatcher,
}

impl LiveReload {
    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Start change notification if enabled. Any failure is logged and
/// leaves reload disabled.
pub async fn start_live_reload(config: &ServerConfig, registry: ReloadRegistry) -> Option<LiveReload> {
    if !config.reload_enabled {
        return None;
    }
    match try_start_live_reload(config, registry).await {
        Ok(live) => Some(live),
        Err(e) => {
            tracing::warn!(error = %e, "Live reload unavailable");
            None
        }
    }
}

async fn try_start_live_reload(
    config: &ServerConfig,
    registry: ReloadRegistry,
) -> Result<LiveReload, WatchError> {
    let server = ReloadServer::bind(&config.reload_address(), registry.clone()).await?;
    let port = server.local_addr().map_err(WatchError::Bind)?.port();

    let watcher = ChangeWatcher::start(
        NotifySource::new(),
        &WatchSet::from_config(config),
        registry,
        config.root.clone(),
    )?;

    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            tracing::error!(error = %e, "Reload channel stopped");
        }
    });

    Ok(LiveReload {
        port,
        _watcher: watcher,
    })
}

/// Serve `config` until interrupted.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    let address = config.http_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    let port = listener.local_addr().map_err(StartupError::Serve)?.port();

    let live_reload = start_live_reload(&config, ReloadRegistry::new()).await;
    let reload_port = live_reload.as_ref().map(LiveReload::port);

    announce(&config, port, reload_port);

    let server = HttpServer::new(&config, Arc::new(MarkdownRenderer::default()), reload_port);
    tokio::select! {
        result = server.run(listener) => result.map_err(StartupError::Serve),
        _ = signals::interrupted() => Ok(()),
    }
}

fn announce(config: &ServerConfig, port: u16, reload_port: Option<u16>) {
    tracing::info!("flowerstall running at http://localhost:{port}");
    tracing::info!("Serving {} from {}", config.describe(), config.root.display());
    match reload_port {
        Some(reload_port) => tracing::info!("Live reload on port {reload_port}"),
        None => tracing::info!("Live reload disabled."),
    }
}

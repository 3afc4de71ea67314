//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use flowerstall::config::ServerConfig;
use flowerstall::http::HttpServer;
use flowerstall::reload::{ChangeEvent, ChangeSource, ChangeStream, ReloadRegistry, WatchError, WatchSet};
use flowerstall::render::MarkdownRenderer;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A throwaway document tree.
pub struct Site {
    _dir: TempDir,
    root: PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }
}

/// Start an HTTP server for `config` on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_server(config: &ServerConfig, reload_port: Option<u16>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, Arc::new(MarkdownRenderer::default()), reload_port);
    tokio::spawn(server.run(listener));
    addr
}

/// HTTP client that ignores proxy settings from the environment.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Change source driven by the test instead of the filesystem.
#[allow(dead_code)]
pub struct ManualSource {
    events: Option<ChangeStream>,
}

#[allow(dead_code)]
pub fn manual_source() -> (mpsc::UnboundedSender<ChangeEvent>, ManualSource) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ManualSource { events: Some(rx) })
}

impl ChangeSource for ManualSource {
    fn watch(&mut self, _set: &WatchSet) -> Result<ChangeStream, WatchError> {
        self.events.take().ok_or(WatchError::AlreadyStarted)
    }
}

/// Poll until `registry` holds `expected` subscriptions.
#[allow(dead_code)]
pub async fn wait_for_subscribers(registry: &ReloadRegistry, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.len() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {expected} subscribers, have {}", registry.len()));
}

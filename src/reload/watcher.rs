//! Filesystem change detection.
//!
//! # Responsibilities
//! - Observe the watched paths through a pluggable [`ChangeSource`]
//! - Map raw notifications to [`ChangeEvent`]s
//! - Turn every qualifying event into exactly one reload broadcast
//!
//! # Design Decisions
//! - Notifications cross from the watcher thread to async code over an
//!   unbounded channel, never a shared buffer
//! - No debounce: one qualifying event, one broadcast
//! - Single files are watched through their directory, so rename-over
//!   saves and not-yet-created files keep reporting

use std::path::{Component, Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{ServeMode, ServerConfig};
use crate::reload::registry::{ReloadRegistry, ReloadSignal};
use crate::reload::WatchError;

/// File extensions whose changes trigger a reload.
pub const WATCHED_EXTENSIONS: &[&str] = &["md", "html", "css", "js"];

/// Stream of change events produced by a [`ChangeSource`].
pub type ChangeStream = mpsc::UnboundedReceiver<ChangeEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// A filesystem change reported by a [`ChangeSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub paths: Vec<PathBuf>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            paths: vec![path.into()],
        }
    }

    /// Translate a notify event. Access and unclassified events are dropped.
    pub fn from_notify(event: Event) -> Option<Self> {
        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Modify(_) => ChangeKind::Modified,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return None,
        };
        Some(Self {
            kind,
            paths: event.paths,
        })
    }

    /// First path with a watched extension, if any.
    pub fn relevant_path(&self) -> Option<&Path> {
        self.paths
            .iter()
            .map(PathBuf::as_path)
            .find(|path| has_watched_extension(path))
    }
}

fn has_watched_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WATCHED_EXTENSIONS
                .iter()
                .any(|watched| ext.eq_ignore_ascii_case(watched))
        })
        .unwrap_or(false)
}

/// What to observe: the paths handed to the native watcher, whether to
/// descend into them, and optionally the exact files that count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
    /// When non-empty, changes to anything else under `paths` are dropped.
    pub files: Vec<PathBuf>,
}

impl WatchSet {
    /// Single-document mode watches the target and its stylesheets only;
    /// directory mode watches the whole root.
    pub fn from_config(config: &ServerConfig) -> Self {
        match &config.mode {
            ServeMode::SingleDocument { target, .. } => {
                let mut files = vec![target.clone()];
                files.extend(config.stylesheets.iter().map(|s| s.path.clone()));
                Self::files(files)
            }
            ServeMode::Directory => Self::tree(config.root.clone()),
        }
    }

    /// Everything below `root`.
    pub fn tree(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![root.into()],
            recursive: true,
            files: Vec::new(),
        }
    }

    /// Exactly `files`, observed through their parent directories so a
    /// rename over a file, or a file created later, is still seen.
    pub fn files(files: Vec<PathBuf>) -> Self {
        let mut paths: Vec<PathBuf> = Vec::new();
        for file in &files {
            let parent = file
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            if !paths.iter().any(|p| p == parent) {
                paths.push(parent.to_path_buf());
            }
        }
        Self {
            paths,
            recursive: false,
            files,
        }
    }

    /// Whether a change to `path` belongs to this set.
    pub fn admits(&self, path: &Path) -> bool {
        self.files.is_empty() || self.files.iter().any(|file| file == path)
    }

    /// `event` reduced to the paths this set admits, or `None` if none remain.
    pub fn narrow(&self, mut event: ChangeEvent) -> Option<ChangeEvent> {
        event.paths.retain(|path| self.admits(path));
        (!event.paths.is_empty()).then_some(event)
    }
}

/// Source of filesystem change events.
pub trait ChangeSource: Send {
    /// Begin observing `set`. Events arrive on the returned stream until the
    /// source is dropped.
    fn watch(&mut self, set: &WatchSet) -> Result<ChangeStream, WatchError>;
}

/// [`ChangeSource`] backed by the platform's native notification API.
#[derive(Default)]
pub struct NotifySource {
    watcher: Option<RecommendedWatcher>,
}

impl NotifySource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeSource for NotifySource {
    fn watch(&mut self, set: &WatchSet) -> Result<ChangeStream, WatchError> {
        if self.watcher.is_some() {
            return Err(WatchError::AlreadyStarted);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let filter = set.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let change = ChangeEvent::from_notify(event).and_then(|c| filter.narrow(c));
                    if let Some(change) = change {
                        let _ = tx.send(change);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default(),
        )?;

        let mode = if set.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        for path in &set.paths {
            watcher.watch(path, mode)?;
        }

        self.watcher = Some(watcher);
        Ok(rx)
    }
}

/// Running change watcher. Dropping it stops notifications.
pub struct ChangeWatcher {
    _source: Box<dyn ChangeSource>,
    task: JoinHandle<()>,
}

impl ChangeWatcher {
    /// Start `source` on `set` and forward its events to `registry`.
    pub fn start<S>(
        mut source: S,
        set: &WatchSet,
        registry: ReloadRegistry,
        root: PathBuf,
    ) -> Result<Self, WatchError>
    where
        S: ChangeSource + 'static,
    {
        let events = source.watch(set)?;
        tracing::info!(
            paths = ?set.paths,
            recursive = set.recursive,
            files = set.files.len(),
            "File watcher started"
        );

        let task = tokio::spawn(forward_changes(events, registry, root));
        Ok(Self {
            _source: Box::new(source),
            task,
        })
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Broadcast one reload signal per qualifying event until `events` closes.
pub async fn forward_changes(mut events: ChangeStream, registry: ReloadRegistry, root: PathBuf) {
    while let Some(event) = events.recv().await {
        let Some(path) = event.relevant_path() else {
            tracing::trace!(paths = ?event.paths, "Ignoring change to unwatched file type");
            continue;
        };

        let url_path = display_path(&root, path);
        let delivered = registry.broadcast(&ReloadSignal::reload(url_path.as_str()));
        tracing::debug!(
            kind = ?event.kind,
            path = %url_path,
            delivered,
            "Change detected, reload broadcast"
        );
    }
}

/// Root-relative `/`-separated form of `path`, or the full path when it
/// lies outside `root`.
fn display_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => {
            let mut out = String::new();
            for component in relative.components() {
                if let Component::Normal(part) = component {
                    out.push('/');
                    out.push_str(&part.to_string_lossy());
                }
            }
            if out.is_empty() {
                out.push('/');
            }
            out
        }
        Err(_) => path.display().to_string(),
    }
}

//! Live reload subsystem.
//!
//! # Data Flow
//! ```text
//! filesystem ─▶ ChangeSource (watcher.rs) ─▶ forward_changes
//!                                                │ broadcast
//!                                                ▼
//! browser ◀── WebSocket (channel.rs) ◀── ReloadRegistry (registry.rs)
//! ```
//!
//! # Design Decisions
//! - Any startup failure here disables reload; the HTTP server keeps running
//! - The registry is shared by handle, not through a global

pub mod channel;
pub mod registry;
pub mod watcher;

use thiserror::Error;

pub use channel::{ReloadServer, Subscription, SubscriptionState};
pub use registry::{ReloadRegistry, ReloadSignal, SubscriptionId};
pub use watcher::{
    forward_changes, ChangeEvent, ChangeKind, ChangeSource, ChangeStream, ChangeWatcher,
    NotifySource, WatchSet, WATCHED_EXTENSIONS,
};

/// Path of the WebSocket endpoint on the reload port.
pub const RELOAD_ENDPOINT: &str = "/livereload";

/// Reasons change notification could not be started.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to bind reload port: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to watch files: {0}")]
    Notify(#[from] notify::Error),

    #[error("change source already started")]
    AlreadyStarted,
}

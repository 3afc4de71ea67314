//! Live subscription registry.
//!
//! # Responsibilities
//! - Hand out one receiver per connected browser channel
//! - Fan a reload signal out to every live subscription
//! - Drop subscriptions whose receiver is gone
//!
//! # Design Decisions
//! - Whole-entry insert/remove on a concurrent map; entries are never
//!   mutated in place
//! - Dead entries are pruned lazily on the next broadcast, no health loop
//! - Passed explicitly to the watcher and the side-channel server

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;

/// Unique identifier for a reload subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Message pushed to browsers when a watched file changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadSignal {
    /// Always `"reload"`.
    pub command: &'static str,
    /// Root-relative path of the file that changed.
    pub path: String,
}

impl ReloadSignal {
    pub fn reload(path: impl Into<String>) -> Self {
        Self {
            command: "reload",
            path: path.into(),
        }
    }
}

/// Set of currently connected reload channels.
#[derive(Debug, Clone, Default)]
pub struct ReloadRegistry {
    subscribers: Arc<DashMap<SubscriptionId, mpsc::UnboundedSender<ReloadSignal>>>,
    next_id: Arc<AtomicU64>,
}

impl ReloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscription.
    pub fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<ReloadSignal>) {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Number of registered subscriptions, including ones not yet pruned.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Send `signal` to every subscription, pruning the ones that are gone.
    ///
    /// Returns how many subscriptions accepted the signal.
    pub fn broadcast(&self, signal: &ReloadSignal) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.subscribers.iter() {
            if entry.value().send(signal.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        // Removal happens after iteration; DashMap shards stay locked while iterating.
        for id in dead {
            self.subscribers.remove(&id);
            tracing::debug!(subscription = %id, "Pruned closed reload subscription");
        }

        delivered
    }
}

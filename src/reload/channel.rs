//! Browser side-channel for reload signals.
//!
//! # Data Flow
//! ```text
//! browser ──WebSocket──▶ ReloadServer ──subscribe──▶ ReloadRegistry
//! browser ◀──{"command":"reload"}── pump ◀── broadcast ◀── ChangeWatcher
//! ```
//!
//! Each connection walks `Connecting → Open → Closed`. Incoming frames are
//! read only to notice the close.

use std::io;
use std::net::SocketAddr;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::reload::registry::{ReloadRegistry, ReloadSignal, SubscriptionId};
use crate::reload::{WatchError, RELOAD_ENDPOINT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Connecting,
    Open,
    Closed,
}

/// One browser channel's membership in the registry.
#[derive(Debug)]
pub struct Subscription {
    registry: ReloadRegistry,
    state: SubscriptionState,
    id: Option<SubscriptionId>,
    signals: Option<mpsc::UnboundedReceiver<ReloadSignal>>,
}

impl Subscription {
    pub fn connecting(registry: ReloadRegistry) -> Self {
        Self {
            registry,
            state: SubscriptionState::Connecting,
            id: None,
            signals: None,
        }
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Register with the registry. Only valid while connecting.
    pub fn open(&mut self) {
        if self.state != SubscriptionState::Connecting {
            return;
        }
        let (id, signals) = self.registry.subscribe();
        tracing::debug!(subscription = %id, "Reload channel open");
        self.id = Some(id);
        self.signals = Some(signals);
        self.state = SubscriptionState::Open;
    }

    /// Next signal for this channel; `None` once it is not open.
    pub async fn next_signal(&mut self) -> Option<ReloadSignal> {
        match self.signals.as_mut() {
            Some(signals) => signals.recv().await,
            None => None,
        }
    }

    /// Leave the registry. Idempotent.
    pub fn close(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.unsubscribe(id);
            tracing::debug!(subscription = %id, "Reload channel closed");
        }
        self.signals = None;
        self.state = SubscriptionState::Closed;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Listener for the live reload side-channel.
pub struct ReloadServer {
    listener: TcpListener,
    registry: ReloadRegistry,
}

impl ReloadServer {
    pub async fn bind(address: &str, registry: ReloadRegistry) -> Result<Self, WatchError> {
        let listener = TcpListener::bind(address).await.map_err(WatchError::Bind)?;
        Ok(Self { listener, registry })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn router(registry: ReloadRegistry) -> Router {
        Router::new()
            .route(RELOAD_ENDPOINT, get(upgrade))
            .with_state(registry)
    }

    /// Accept reload connections until the task is dropped.
    pub async fn run(self) -> io::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!(address = %addr, "Reload channel listening");
        axum::serve(self.listener, Self::router(self.registry)).await
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(registry): State<ReloadRegistry>) -> Response {
    let subscription = Subscription::connecting(registry);
    ws.on_upgrade(move |socket| pump(socket, subscription))
}

async fn pump(socket: WebSocket, mut subscription: Subscription) {
    subscription.open();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            signal = subscription.next_signal() => {
                let Some(signal) = signal else { break };
                let payload = match serde_json::to_string(&signal) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to encode reload signal");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(payload.into())).await {
                    tracing::debug!(error = %e, "Reload channel send failed");
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Reload channel read failed");
                    break;
                }
                Some(Ok(_)) => {}
            }
        }
    }

    subscription.close();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_registers_and_unregisters() {
        let registry = ReloadRegistry::new();
        let mut subscription = Subscription::connecting(registry.clone());
        assert_eq!(subscription.state(), SubscriptionState::Connecting);
        assert!(registry.is_empty());

        subscription.open();
        assert_eq!(subscription.state(), SubscriptionState::Open);
        assert_eq!(registry.len(), 1);

        subscription.close();
        assert_eq!(subscription.state(), SubscriptionState::Closed);
        assert!(registry.is_empty());
    }

    #[test]
    fn closed_subscription_cannot_reopen() {
        let registry = ReloadRegistry::new();
        let mut subscription = Subscription::connecting(registry.clone());
        subscription.close();
        subscription.open();
        assert_eq!(subscription.state(), SubscriptionState::Closed);
        assert!(registry.is_empty());
    }

    #[test]
    fn drop_unregisters() {
        let registry = ReloadRegistry::new();
        let mut subscription = Subscription::connecting(registry.clone());
        subscription.open();
        drop(subscription);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn open_subscription_receives_broadcast() {
        let registry = ReloadRegistry::new();
        let mut subscription = Subscription::connecting(registry.clone());
        subscription.open();

        registry.broadcast(&ReloadSignal::reload("/index.md"));
        assert_eq!(
            subscription.next_signal().await,
            Some(ReloadSignal::reload("/index.md"))
        );
    }

    #[tokio::test]
    async fn unopened_subscription_yields_nothing() {
        let mut subscription = Subscription::connecting(ReloadRegistry::new());
        assert_eq!(subscription.next_signal().await, None);
    }
}

//! Listener callbacks and the registry that dispatches to them.
//!
//! ## Registration semantics
//!
//! A listener is identified by its `Arc` allocation:
//! - registering the same `Arc` twice keeps a single entry (`add` returns `false`)
//! - removing a listener that is not registered does nothing (`remove` returns `false`)
//!
//! Dispatch follows registration order and runs over a snapshot of the list,
//! so callbacks may add or remove listeners themselves.

use std::{fmt, sync::Arc};

use tokio::sync::RwLock;

use crate::dto::websocket::NotificationEvent;

/// Why the notification socket went down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `close()` was called locally
    Requested,
    /// The service closed the socket
    Remote,
    /// The socket failed
    Error(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("closed locally"),
            Self::Remote => f.write_str("closed by the service"),
            Self::Error(error) => write!(f, "socket error: {}", error),
        }
    }
}

/// Receiver of notification events
///
/// Callbacks run on the transport's receive task and must not block.
pub trait ClientListener: Send + Sync {
    fn on_connected(&self) {}

    fn on_notification(&self, _event: &NotificationEvent) {}

    fn on_disconnected(&self, _reason: &DisconnectReason) {}
}

/// Lock-guarded list of listeners
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn ClientListener>>>,
}

fn same_listener(a: &Arc<dyn ClientListener>, b: &Arc<dyn ClientListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub async fn add(&self, listener: Arc<dyn ClientListener>) -> bool {
        let mut listeners = self.listeners.write().await;
        if listeners.iter().any(|existing| same_listener(existing, &listener)) {
            tracing::debug!("Listener already registered, ignoring");
            return false;
        }
        listeners.push(listener);
        tracing::debug!("Listener registered ({} total)", listeners.len());
        true
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub async fn remove(&self, listener: &Arc<dyn ClientListener>) -> bool {
        let mut listeners = self.listeners.write().await;
        let before = listeners.len();
        listeners.retain(|existing| !same_listener(existing, listener));
        let removed = listeners.len() != before;
        if removed {
            tracing::debug!("Listener unregistered ({} left)", listeners.len());
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }

    async fn snapshot(&self) -> Vec<Arc<dyn ClientListener>> {
        self.listeners.read().await.clone()
    }

    pub async fn notify_connected(&self) {
        for listener in self.snapshot().await {
            listener.on_connected();
        }
    }

    pub async fn notify_notification(&self, event: &NotificationEvent) {
        for listener in self.snapshot().await {
            listener.on_notification(event);
        }
    }

    pub async fn notify_disconnected(&self, reason: &DisconnectReason) {
        for listener in self.snapshot().await {
            listener.on_disconnected(reason);
        }
    }
}

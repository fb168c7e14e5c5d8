//! Notification sinks for user-visible failures.

use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Warning,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }
}

pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
}

/// Writes notifications to the log.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn show(&self, notification: Notification) {
        let message = notification.message.as_str();
        match notification.kind {
            NotificationKind::Error => error!(toast = message, "notification"),
            NotificationKind::Warning => warn!(toast = message, "notification"),
            NotificationKind::Info | NotificationKind::Success => {
                info!(toast = message, "notification")
            }
        }
    }
}

/// Fans notifications out to any number of subscribers, e.g. a toast renderer.
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl NotificationSink for BroadcastSink {
    fn show(&self, notification: Notification) {
        // Fails only when no receiver is subscribed.
        let _ = self.tx.send(notification);
    }
}

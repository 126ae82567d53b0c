//! Events published by the directory for a front end to render.

use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user, such as a toast or a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    Notice(Notice),

    /// A list refresh failed and the cached list was kept. No notice is raised
    /// for this, so stale data stays on screen unless the receiver surfaces
    /// it.
    RefreshFailed { reason: String },
}

/// Sending half of the event channel. Events sent after the receiver is gone
/// are dropped.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<DirectoryEvent>,
}

pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<DirectoryEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, rx)
}

impl Notifier {
    pub fn success(&self, message: impl Into<String>) {
        self.send(DirectoryEvent::Notice(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(DirectoryEvent::Notice(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }));
    }

    pub fn refresh_failed(&self, reason: impl Into<String>) {
        self.send(DirectoryEvent::RefreshFailed {
            reason: reason.into(),
        });
    }

    fn send(&self, event: DirectoryEvent) {
        if self.tx.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }
}

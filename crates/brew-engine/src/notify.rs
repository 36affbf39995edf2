//! # User Notifications
//!
//! Typed notices the engine pushes toward the register UI. The engine
//! never talks to a window or a toast library; it hands [`Notice`] values
//! to a [`NotificationSink`] and moves on.
//!
//! ```text
//! orchestrator ──► NotificationSink::notify ──► ChannelNotifier ──► UI drains
//! ```
//!
//! Delivery is best-effort by design: a notice that nobody is listening
//! for is dropped, it never blocks or fails a submission.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// =============================================================================
// Notice
// =============================================================================

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One user-visible message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Notice {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Notice {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Notice {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

// =============================================================================
// Notification Sink
// =============================================================================

/// Where notices go. Object-safe so the orchestrator can hold a `dyn` sink.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::error(message));
    }

    fn info(&self, message: &str) {
        self.notify(Notice::info(message));
    }
}

/// Sink that pushes notices into an unbounded channel for the UI to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (ChannelNotifier, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl NotificationSink for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Receiver gone means the UI shut down first; nothing to tell it.
        let _ = self.tx.send(notice);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing notices.
//!
//! Notices are the hub's transient feedback channel: explicit user actions
//! emit one on success and one on failure, passive reads and background
//! refreshes never emit any. Delivery is best-effort broadcast; a hub with
//! no subscribers drops notices silently.

use tokio::sync::broadcast;
use tracing::debug;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient user-facing message emitted by an explicit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Broadcast fan-out for notices.
#[derive(Debug)]
pub struct NoticeSender {
    tx: broadcast::Sender<Notice>,
}

impl NoticeSender {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(Notice::info(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Notice::error(message));
    }

    fn emit(&self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "notice");
        // Err means no live subscribers, which is fine.
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_notices_in_order() {
        let sender = NoticeSender::new(8);
        let mut rx = sender.subscribe();

        sender.info("schedule created");
        sender.error("send failed");

        assert_eq!(rx.recv().await.unwrap(), Notice::info("schedule created"));
        assert_eq!(rx.recv().await.unwrap(), Notice::error("send failed"));
    }

    #[tokio::test]
    async fn emitting_without_subscribers_is_a_no_op() {
        let sender = NoticeSender::new(8);
        sender.info("nobody listening");

        // A subscriber joining later sees only notices emitted after it.
        let mut rx = sender.subscribe();
        sender.info("late");
        assert_eq!(rx.recv().await.unwrap().message, "late");
    }
}

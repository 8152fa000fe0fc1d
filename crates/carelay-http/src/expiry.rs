// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot session-expiry latch.
//!
//! Many in-flight requests can come back 401 at once when a session dies.
//! Only the first may clear the stored token and notify the login boundary;
//! the rest must be side-effect free. The latch is an atomic swap, so the
//! guarantee holds across any interleaving of tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::warn;

use crate::session::SessionStore;

/// Tracks whether the current session has expired and fans the edge out to
/// subscribers (the CLI watch loop, a future login prompt).
#[derive(Debug)]
pub struct SessionExpiry {
    fired: AtomicBool,
    tx: watch::Sender<bool>,
}

impl SessionExpiry {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Whether the session has already been expired.
    pub fn expired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Subscribe to expiry transitions. The receiver observes `true` once the
    /// session expires and `false` again after [`SessionExpiry::reset`].
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Handles a 401. Exactly one caller wins the latch, expires the stored
    /// session (preserving any remembered login), and notifies subscribers.
    /// Returns whether this call was the winner.
    pub fn fire(&self, store: &SessionStore) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Err(e) = store.expire() {
            warn!(error = %e, "failed to persist expired session");
        }
        self.tx.send_replace(true);
        true
    }

    /// Re-arms the latch after a successful login.
    pub fn reset(&self) {
        self.fired.store(false, Ordering::SeqCst);
        self.tx.send_replace(false);
    }
}

impl Default for SessionExpiry {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle type used across the client and hub.
pub type SharedExpiry = Arc<SessionExpiry>;

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn first_fire_wins_and_later_fires_are_inert() {
        let (_dir, store) = temp_store();
        store.set_token("tok").unwrap();
        store.remember("user", "pass").unwrap();
        let expiry = SessionExpiry::new();

        assert!(expiry.fire(&store));
        assert!(store.token().is_none());
        assert!(store.remembered().is_some());

        // Simulate a token appearing while more 401s race in: the latch must
        // not clear it again.
        store.set_token("tok-2").unwrap();
        assert!(!expiry.fire(&store));
        assert_eq!(store.token().as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn subscribers_see_the_expiry_edge() {
        let (_dir, store) = temp_store();
        let expiry = SessionExpiry::new();
        let mut rx = expiry.subscribe();
        assert!(!*rx.borrow());

        expiry.fire(&store);
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[test]
    fn reset_re_arms_the_latch() {
        let (_dir, store) = temp_store();
        store.set_token("tok").unwrap();
        let expiry = SessionExpiry::new();

        assert!(expiry.fire(&store));
        assert!(expiry.expired());

        expiry.reset();
        assert!(!expiry.expired());

        store.set_token("tok-2").unwrap();
        assert!(expiry.fire(&store));
        assert!(store.token().is_none());
    }
}

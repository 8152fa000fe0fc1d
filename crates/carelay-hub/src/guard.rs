// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAII guards for the hub's loading counter and per-action locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use carelay_core::CarelayError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

/// Counts operations currently touching the network. Incremented on begin,
/// decremented when the returned guard drops, so the counter clears on every
/// exit path including panics and early returns.
#[derive(Debug, Default)]
pub struct LoadingCounter {
    active: Arc<AtomicUsize>,
}

impl LoadingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> LoadingGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            active: self.active.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.count() > 0
    }
}

#[derive(Debug)]
pub struct LoadingGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Tracks actions currently in flight, keyed `channel:action[:id]`.
///
/// Submitting a key that is already held fails with
/// [`CarelayError::ActionInFlight`] instead of double-submitting; the slot
/// frees when the returned guard drops.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    pending: Arc<DashMap<String, ()>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, action: impl Into<String>) -> Result<ActionGuard, CarelayError> {
        let action = action.into();
        match self.pending.entry(action.clone()) {
            Entry::Occupied(_) => {
                debug!(action = %action, "rejecting duplicate in-flight action");
                Err(CarelayError::ActionInFlight { action })
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(ActionGuard {
                    pending: self.pending.clone(),
                    action,
                })
            }
        }
    }

    pub fn is_pending(&self, action: &str) -> bool {
        self.pending.contains_key(action)
    }
}

#[derive(Debug)]
pub struct ActionGuard {
    pending: Arc<DashMap<String, ()>>,
    action: String,
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.pending.remove(&self.action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_counter_clears_when_guards_drop() {
        let counter = LoadingCounter::new();
        assert!(!counter.is_loading());

        let a = counter.begin();
        let b = counter.begin();
        assert_eq!(counter.count(), 2);

        drop(a);
        assert_eq!(counter.count(), 1);
        drop(b);
        assert!(!counter.is_loading());
    }

    #[test]
    fn duplicate_action_is_rejected_until_guard_drops() {
        let registry = ActionRegistry::new();

        let guard = registry.begin("email:delete-schedule:s1").unwrap();
        assert!(registry.is_pending("email:delete-schedule:s1"));

        let err = registry.begin("email:delete-schedule:s1").unwrap_err();
        assert!(matches!(err, CarelayError::ActionInFlight { ref action }
            if action == "email:delete-schedule:s1"));

        // A different key is independent.
        let other = registry.begin("email:delete-schedule:s2").unwrap();
        drop(other);

        drop(guard);
        assert!(!registry.is_pending("email:delete-schedule:s1"));
        registry.begin("email:delete-schedule:s1").unwrap();
    }

    #[test]
    fn guard_frees_slot_on_panic_unwind() {
        let registry = ActionRegistry::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = registry.begin("sms:send").unwrap();
            panic!("mid-action failure");
        }));
        assert!(result.is_err());
        assert!(!registry.is_pending("sms:send"));
    }
}

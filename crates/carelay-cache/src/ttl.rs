// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generic keyed TTL map.
//!
//! An entry is valid iff it holds data and was written less than the TTL ago.
//! There is no background sweeper: staleness is judged lazily on `get`, and
//! invalidation empties an entry without removing its slot, so the map's key
//! set stays bounded by what was ever seeded or written.

use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

struct Entry<V> {
    data: Option<V>,
    stored_at: Instant,
}

impl<V> Entry<V> {
    fn empty() -> Self {
        Self {
            data: None,
            stored_at: Instant::now(),
        }
    }
}

/// Concurrent map of `{data, timestamp}` entries with a single fixed TTL.
///
/// Uses [`tokio::time::Instant`] so tests under a paused clock can advance
/// time deterministically.
pub struct TtlMap<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored data only while the entry is valid.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        let data = entry.data.as_ref()?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(data.clone())
        } else {
            None
        }
    }

    /// Whether `get` would currently return data for `key`.
    pub fn is_valid(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.data.is_some() && e.stored_at.elapsed() < self.ttl)
    }

    /// Stores `data` with a fresh timestamp, overwriting any prior entry.
    pub fn set(&self, key: K, data: V) {
        self.entries.insert(
            key,
            Entry {
                data: Some(data),
                stored_at: Instant::now(),
            },
        );
    }

    /// Creates an empty slot for `key` if none exists yet.
    pub fn seed(&self, key: K) {
        self.entries.entry(key).or_insert_with(Entry::empty);
    }

    /// Empties the entry for `key`, keeping its slot.
    pub fn invalidate(&self, key: &K) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.data = None;
        }
    }

    /// Removes every entry whose key matches the predicate, slot included.
    pub fn remove_matching(&self, mut pred: impl FnMut(&K) -> bool) {
        self.entries.retain(|key, _| !pred(key));
    }

    /// Drops all entries and slots.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of slots (valid or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

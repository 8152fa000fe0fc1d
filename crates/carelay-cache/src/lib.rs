// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL caching for the Carelay messaging client.
//!
//! [`TtlMap`] is the generic keyed store (`{data, timestamp}` entries, lazy
//! staleness, no sweeper); [`CollectionCache`] is the fixed-shape instance
//! the hub owns, with one slot per channel collection and filter-keyed
//! history entries.

pub mod store;
pub mod ttl;

pub use store::CollectionCache;
pub use ttl::TtlMap;

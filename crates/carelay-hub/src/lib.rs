// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging orchestration for Carelay.
//!
//! This crate ties the per-channel API clients to the TTL cache and the
//! in-memory collection state, and owns the policies that keep them
//! coherent:
//!
//! - cache-first reads that fail soft (empty vector, error recorded)
//! - guarded mutations that fail loud (invalidate, force-refresh, notice)
//! - a single background task that keeps schedules current
//!
//! # Components
//!
//! - [`MessagingHub`]: the facade everything else talks to
//! - [`notify`]: broadcast notices for user-visible action outcomes
//! - [`guard`]: duplicate-action and loading-activity guards
//! - [`state`]: adopted collections and pure derived views

pub mod guard;
pub mod hub;
pub mod notify;
mod refresh;
pub mod state;

pub use hub::MessagingHub;
pub use notify::{Notice, NoticeLevel};
pub use state::Freshness;

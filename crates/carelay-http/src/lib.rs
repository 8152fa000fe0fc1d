// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client adapter for the Carelay messaging client.
//!
//! This crate owns the outbound boundary to the clinic backend:
//!
//! - [`SessionStore`] — file-backed bearer token plus an optional remembered
//!   login that survives session expiry
//! - [`SessionExpiry`] — one-shot latch turning any number of concurrent 401
//!   responses into exactly one local logout
//! - [`ApiClient`] — request construction, bearer auth, status-to-error
//!   mapping, and transient-error retry for idempotent reads

pub mod client;
pub mod expiry;
pub mod session;

pub use client::ApiClient;
pub use expiry::{SessionExpiry, SharedExpiry};
pub use session::{RememberedLogin, SessionStore};

// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Carelay integration tests.
//!
//! Provides a wiremock-backed mock backend, wire-shape fixtures, and an
//! assembled client stack for fast, deterministic, CI-runnable tests without
//! the real clinic backend.
//!
//! # Components
//!
//! - [`MockBackend`] - wiremock server with stub helpers per endpoint shape
//! - [`TestApi`] - real `ApiClient` + temp session store + expiry latch
//! - [`fixtures`] - JSON bodies in the backend's wire shapes

pub mod backend;
pub mod fixtures;
pub mod harness;

pub use backend::MockBackend;
pub use harness::{TestApi, test_config};

// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Carelay messaging client.

use thiserror::Error;

/// The primary error type used across all Carelay crates.
#[derive(Debug, Error)]
pub enum CarelayError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failures (connection refused, DNS, TLS, broken pipe).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-success status other than 401.
    #[error("backend error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The backend answered 401; the session has been expired locally.
    #[error("session expired")]
    SessionExpired,

    /// A draft failed client-side validation and was never sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A response body could not be decoded into the expected shape.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The same action was submitted again while the first was still pending.
    #[error("action already in flight: {action}")]
    ActionInFlight { action: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Session-file storage errors (unreadable file, serialization failure).
    #[error("session storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

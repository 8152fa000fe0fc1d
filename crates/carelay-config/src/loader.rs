// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./carelay.toml` > `~/.config/carelay/carelay.toml`
//! > `/etc/carelay/carelay.toml` with environment variable overrides via the
//! `CARELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Data, Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::CarelayConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/carelay/carelay.toml` (system-wide)
/// 3. `~/.config/carelay/carelay.toml` (user XDG config)
/// 4. `./carelay.toml` (local directory)
/// 5. `CARELAY_*` environment variables
pub fn load_config() -> Result<CarelayConfig, figment::Error> {
    let user_file = dirs::config_dir()
        .map(|d| d.join("carelay/carelay.toml"))
        .unwrap_or_default();
    Figment::new()
        .merge(Serialized::defaults(CarelayConfig::default()))
        .merge(toml_layer(Path::new("/etc/carelay/carelay.toml")))
        .merge(toml_layer(&user_file))
        .merge(toml_layer(Path::new("carelay.toml")))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CarelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CarelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CarelayConfig::default()))
        .merge(toml_layer(path))
        .merge(env_provider())
        .extract()
}

/// One TOML layer of the merge chain, with a trace of whether the file was
/// actually there to contribute.
fn toml_layer(path: &Path) -> Data<Toml> {
    if path.exists() {
        debug!(path = %path.display(), "merging config file");
    } else {
        debug!(path = %path.display(), "config file absent, layer skipped");
    }
    Toml::file(path)
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CARELAY_BACKEND_BASE_URL` must map to
/// `backend.base_url`, not `backend.base.url`.
fn env_provider() -> Env {
    Env::prefixed("CARELAY_").map(|key| map_env_key(key.as_str()).into())
}

/// Rewrite a prefix-stripped, lowercased env var name into a dotted config
/// path. Only the leading section name becomes a dot; the rest of the key
/// keeps its underscores.
fn map_env_key(key: &str) -> String {
    key.replacen("backend_", "backend.", 1)
        .replacen("session_", "session.", 1)
        .replacen("cache_", "cache.", 1)
        .replacen("refresh_", "refresh.", 1)
        .replacen("channels_", "channels.", 1)
        .replacen("log_", "log.", 1)
}

// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Carelay messaging client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use carelay_core::ChannelKind;
use serde::{Deserialize, Serialize};

/// Top-level Carelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CarelayConfig {
    /// Backend origin and request behavior.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session token storage.
    #[serde(default)]
    pub session: SessionConfig,

    /// Collection cache behavior.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background schedule refresh.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Per-channel enablement.
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Backend origin and request behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base origin of the clinic backend. All channel paths hang off this.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for idempotent GET requests on transient failures.
    /// Writes are never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_base_url() -> String {
    "https://bkdemo1.clinicpro.cc".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

/// Session token storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Path of the JSON session file holding the bearer token and the
    /// remembered login, if any.
    #[serde(default = "default_session_file")]
    pub file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

fn default_session_file() -> String {
    dirs::data_dir()
        .map(|p| p.join("carelay").join("session.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("session.json"))
        .to_string_lossy()
        .into_owned()
}

/// Collection cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a cached collection stays fresh.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}

/// Background schedule refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshConfig {
    /// Enable the periodic schedule refresher.
    #[serde(default = "default_refresh_enabled")]
    pub enabled: bool,

    /// Refresh interval in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_refresh_enabled(),
            interval_secs: default_refresh_interval_secs(),
        }
    }
}

fn default_refresh_enabled() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    120
}

/// Per-channel enablement flags.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelsConfig {
    #[serde(default = "default_channel_enabled")]
    pub whatsapp: bool,

    #[serde(default = "default_channel_enabled")]
    pub email: bool,

    #[serde(default = "default_channel_enabled")]
    pub sms: bool,
}

impl ChannelsConfig {
    pub fn is_enabled(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::WhatsApp => self.whatsapp,
            ChannelKind::Email => self.email,
            ChannelKind::Sms => self.sms,
        }
    }

    /// Enabled channels in canonical order.
    pub fn enabled(&self) -> Vec<ChannelKind> {
        ChannelKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            whatsapp: default_channel_enabled(),
            email: default_channel_enabled(),
            sms: default_channel_enabled(),
        }
    }
}

fn default_channel_enabled() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_backend_contract() {
        let config = CarelayConfig::default();
        assert_eq!(config.backend.base_url, "https://bkdemo1.clinicpro.cc");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.max_retries, 2);
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.refresh.enabled);
        assert_eq!(config.refresh.interval_secs, 120);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn all_channels_enabled_by_default() {
        let channels = ChannelsConfig::default();
        assert_eq!(channels.enabled(), ChannelKind::ALL.to_vec());
    }

    #[test]
    fn disabled_channels_are_filtered() {
        let channels = ChannelsConfig {
            whatsapp: true,
            email: false,
            sms: true,
        };
        assert_eq!(
            channels.enabled(),
            vec![ChannelKind::WhatsApp, ChannelKind::Sms]
        );
        assert!(!channels.is_enabled(ChannelKind::Email));
    }

    #[test]
    fn session_file_defaults_under_data_dir() {
        let session = SessionConfig::default();
        assert!(session.file.ends_with("session.json"));
    }
}

// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a well-formed backend origin and sane timer values.

use crate::diagnostic::ConfigError;
use crate::model::CarelayConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CarelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.backend.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.base_url must not be empty".to_string(),
        });
    } else {
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            errors.push(ConfigError::Validation {
                message: format!("backend.base_url `{base_url}` must start with http:// or https://"),
            });
        }
        if base_url.contains(char::is_whitespace) {
            errors.push(ConfigError::Validation {
                message: format!("backend.base_url `{base_url}` must not contain whitespace"),
            });
        }
    }

    if config.backend.timeout_secs == 0 || config.backend.timeout_secs > 300 {
        errors.push(ConfigError::Validation {
            message: format!(
                "backend.timeout_secs must be between 1 and 300, got {}",
                config.backend.timeout_secs
            ),
        });
    }

    if config.session.file.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "session.file must not be empty".to_string(),
        });
    }

    if config.cache.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.ttl_secs must be at least 1".to_string(),
        });
    }

    if config.refresh.enabled && config.refresh.interval_secs < 10 {
        errors.push(ConfigError::Validation {
            message: format!(
                "refresh.interval_secs must be at least 10, got {}",
                config.refresh.interval_secs
            ),
        });
    }

    if config.channels.enabled().is_empty() {
        errors.push(ConfigError::Validation {
            message: "at least one channel must be enabled under [channels]".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

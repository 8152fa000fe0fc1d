// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared command context.
//!
//! Every subcommand talks to the backend through the same stack: session
//! store, expiry latch, API client, hub. [`CliContext::build`] wires it once
//! from the loaded configuration.

use std::sync::Arc;

use carelay_config::model::CarelayConfig;
use carelay_core::{CarelayError, ChannelKind};
use carelay_http::{ApiClient, SessionExpiry, SessionStore, SharedExpiry};
use carelay_hub::MessagingHub;

pub struct CliContext {
    pub config: CarelayConfig,
    pub session: Arc<SessionStore>,
    pub expiry: SharedExpiry,
    pub hub: MessagingHub,
}

impl CliContext {
    pub fn build(config: CarelayConfig) -> Result<Self, CarelayError> {
        let session = Arc::new(SessionStore::open(&config.session.file)?);
        let expiry: SharedExpiry = Arc::new(SessionExpiry::new());
        let api = Arc::new(ApiClient::new(
            &config.backend,
            session.clone(),
            expiry.clone(),
        )?);
        let hub = MessagingHub::new(&config, api);
        Ok(Self {
            config,
            session,
            expiry,
            hub,
        })
    }

    /// Commands that talk to the backend need a stored token first.
    pub fn require_token(&self) -> Result<(), CarelayError> {
        if self.session.has_token() {
            Ok(())
        } else {
            Err(CarelayError::Config(
                "no session token stored; run `carelay login --token <token>`".into(),
            ))
        }
    }

    /// Rejects channels switched off in configuration.
    pub fn ensure_enabled(&self, kind: ChannelKind) -> Result<(), CarelayError> {
        if self.config.channels.is_enabled(kind) {
            Ok(())
        } else {
            Err(CarelayError::Validation(format!(
                "channel {kind} is disabled in configuration"
            )))
        }
    }

    /// Hub reads are fail-soft: a failed fetch returns empty and records the
    /// error. A one-shot command starts with a clean slate, so anything
    /// recorded belongs to this invocation and becomes the command outcome.
    pub async fn read_failure(&self) -> Result<(), CarelayError> {
        if self.expiry.expired() {
            return Err(CarelayError::SessionExpired);
        }
        match self.hub.last_error().await {
            Some(message) => Err(CarelayError::Transport {
                message,
                source: None,
            }),
            None => Ok(()),
        }
    }
}

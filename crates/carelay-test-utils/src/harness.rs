// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembled client stack for integration tests.
//!
//! [`TestApi`] wires a real [`ApiClient`] with a temp-dir session store and a
//! fresh expiry latch against a given base URL, the way the binary does at
//! startup, minus config loading.

use std::sync::Arc;

use carelay_config::model::CarelayConfig;
use carelay_http::{ApiClient, SessionExpiry, SessionStore, SharedExpiry};

/// Config pointing at a test backend: short timeout, no read retries.
pub fn test_config(base_url: &str) -> CarelayConfig {
    let mut config = CarelayConfig::default();
    config.backend.base_url = base_url.to_string();
    config.backend.timeout_secs = 5;
    config.backend.max_retries = 0;
    config
}

/// A real client stack against a test backend.
pub struct TestApi {
    pub config: CarelayConfig,
    pub api: Arc<ApiClient>,
    pub session: Arc<SessionStore>,
    pub expiry: SharedExpiry,
    _dir: tempfile::TempDir,
}

impl TestApi {
    pub fn new(base_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let session_file = dir.path().join("session.json");

        let mut config = test_config(base_url);
        config.session.file = session_file.to_string_lossy().into_owned();

        let session = Arc::new(SessionStore::open(session_file).expect("open session store"));
        let expiry: SharedExpiry = Arc::new(SessionExpiry::new());
        let api = Arc::new(
            ApiClient::new(&config.backend, session.clone(), expiry.clone())
                .expect("build api client"),
        );

        Self {
            config,
            api,
            session,
            expiry,
            _dir: dir,
        }
    }

    /// Pre-authenticates the session store.
    pub fn with_token(self, token: &str) -> Self {
        self.session.set_token(token).expect("set token");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_starts_unauthenticated() {
        let t = TestApi::new("http://127.0.0.1:9");
        assert!(t.session.token().is_none());
        assert!(!t.expiry.expired());

        let t = t.with_token("tok-test");
        assert_eq!(t.session.token().as_deref(), Some("tok-test"));
    }

    #[test]
    fn test_config_disables_read_retries() {
        let config = test_config("http://127.0.0.1:9");
        assert_eq!(config.backend.max_retries, 0);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9");
        // Defaults everywhere else.
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.refresh.enabled);
    }
}

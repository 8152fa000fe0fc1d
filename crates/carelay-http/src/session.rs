// SPDX-FileCopyrightText: 2026 Carelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed session storage.
//!
//! Holds the bearer token and, optionally, a remembered login so the user can
//! re-authenticate after the session expires. The snapshot lives behind an
//! `ArcSwap` so every request reads it without locking; mutations persist the
//! new snapshot to a JSON file before swapping it in.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use carelay_core::CarelayError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Credentials the user asked to remember across session expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedLogin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RememberedLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RememberedLogin")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct SessionSnapshot {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    remembered: Option<RememberedLogin>,
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("remembered", &self.remembered)
            .finish()
    }
}

/// Session persistence for the Carelay client.
///
/// All reads are lock-free snapshot loads; all mutations write the session
/// file first, then publish the new snapshot.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: ArcSwap<SessionSnapshot>,
}

impl SessionStore {
    /// Opens the session store at `path`, loading the existing file if there
    /// is one. A missing file is an empty session, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CarelayError> {
        let path = path.into();
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| CarelayError::Storage {
                source: Box::new(e),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no session file, starting empty");
                SessionSnapshot::default()
            }
            Err(e) => return Err(CarelayError::Storage { source: Box::new(e) }),
        };
        Ok(Self {
            path,
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current bearer token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.current.load().token.clone()
    }

    pub fn has_token(&self) -> bool {
        self.current.load().token.is_some()
    }

    /// The remembered login, if the user opted in.
    pub fn remembered(&self) -> Option<RememberedLogin> {
        self.current.load().remembered.clone()
    }

    /// Stores a new bearer token.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), CarelayError> {
        let mut next = self.snapshot();
        next.token = Some(token.into());
        self.commit(next)
    }

    /// Stores a remembered login alongside whatever token exists.
    pub fn remember(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), CarelayError> {
        let mut next = self.snapshot();
        next.remembered = Some(RememberedLogin {
            username: username.into(),
            password: password.into(),
        });
        self.commit(next)
    }

    /// Expires the session: the token is dropped but the remembered login,
    /// if any, survives so the user can log straight back in.
    pub fn expire(&self) -> Result<(), CarelayError> {
        let mut next = self.snapshot();
        next.token = None;
        self.commit(next)
    }

    /// Clears everything, including the remembered login. Used by logout.
    pub fn clear(&self) -> Result<(), CarelayError> {
        self.commit(SessionSnapshot::default())
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::clone(&self.current.load())
    }

    fn commit(&self, next: SessionSnapshot) -> Result<(), CarelayError> {
        self.persist(&next)?;
        self.current.store(Arc::new(next));
        Ok(())
    }

    fn persist(&self, snapshot: &SessionSnapshot) -> Result<(), CarelayError> {
        use std::io::Write;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CarelayError::Storage {
                source: Box::new(e),
            })?;
        }
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| CarelayError::Storage {
            source: Box::new(e),
        })?;
        // The file holds credentials; it is born owner-only, never chmod'd
        // into shape after the bytes land.
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| CarelayError::Storage {
            source: Box::new(e),
        })?;
        file.write_all(json.as_bytes())
            .map_err(|e| CarelayError::Storage {
                source: Box::new(e),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("session.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_starts_empty() {
        let (_dir, store) = temp_store();
        assert!(store.token().is_none());
        assert!(store.remembered().is_none());
    }

    #[test]
    fn token_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open(&path).unwrap();
        store.set_token("tok-abc").unwrap();
        store.remember("frontdesk", "hunter2").unwrap();
        drop(store);

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("tok-abc"));
        assert_eq!(reopened.remembered().unwrap().username, "frontdesk");
    }

    #[test]
    fn expire_drops_token_but_keeps_remembered() {
        let (_dir, store) = temp_store();
        store.set_token("tok-abc").unwrap();
        store.remember("frontdesk", "hunter2").unwrap();

        store.expire().unwrap();

        assert!(store.token().is_none());
        let remembered = store.remembered().expect("remembered login survives expiry");
        assert_eq!(remembered.username, "frontdesk");
        assert_eq!(remembered.password, "hunter2");
    }

    #[test]
    fn clear_wipes_everything() {
        let (_dir, store) = temp_store();
        store.set_token("tok-abc").unwrap();
        store.remember("frontdesk", "hunter2").unwrap();

        store.clear().unwrap();

        assert!(store.token().is_none());
        assert!(store.remembered().is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let (_dir, store) = temp_store();
        store.set_token("tok-secret").unwrap();
        store.remember("frontdesk", "hunter2").unwrap();

        let debug = format!("{:?}", store.current.load());
        assert!(!debug.contains("tok-secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::open(&path).unwrap();
        store.set_token("tok-abc").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Rewrites keep the mode too.
        store.remember("frontdesk", "hunter2").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = SessionStore::open(&path);
        assert!(matches!(result, Err(CarelayError::Storage { .. })));
    }
}

//! Credential persistence abstraction.
//!
//! The store is the single mutable resource shared between the request
//! client (token reads, refresh writes), the auth flows (login/logout
//! writes), and the session clock (expiry marker). Writes are whole-value
//! replacements under a lock, so there are no torn writes to coordinate.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::{CredentialUpdate, Credentials};

/// Key-value persistence for credentials and session markers.
///
/// All operations are infallible by contract: implementations absorb
/// storage failures and degrade to "nothing stored". No exception may
/// escape a read or write.
pub trait CredentialStore: Send + Sync {
    /// Current token pair; empty when nothing is stored.
    fn credentials(&self) -> Credentials;

    /// Merge `update` into the stored tokens.
    fn update(&self, update: CredentialUpdate);

    /// Remove both tokens.
    fn clear(&self);

    /// Session expiry as epoch milliseconds, if a session was established.
    fn session_expiry(&self) -> Option<i64>;

    fn set_session_expiry(&self, epoch_ms: i64);

    fn clear_session_expiry(&self);

    /// Last-known admin role flag.
    fn is_admin(&self) -> bool;

    fn set_is_admin(&self, is_admin: bool);
}

/// Serialized document shape shared by the store implementations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_expires_at_ms: Option<i64>,
    #[serde(default)]
    is_admin: bool,
}

impl StoredState {
    fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    fn apply(&mut self, update: CredentialUpdate) {
        if let Some(access) = update.access_token {
            self.access_token = Some(access);
        }
        if let Some(refresh) = update.refresh_token {
            self.refresh_token = Some(refresh);
        }
    }
}

/// In-memory store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    state: RwLock<StoredState>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn credentials(&self) -> Credentials {
        self.state.read().credentials()
    }

    fn update(&self, update: CredentialUpdate) {
        self.state.write().apply(update);
    }

    fn clear(&self) {
        let mut state = self.state.write();
        state.access_token = None;
        state.refresh_token = None;
    }

    fn session_expiry(&self) -> Option<i64> {
        self.state.read().session_expires_at_ms
    }

    fn set_session_expiry(&self, epoch_ms: i64) {
        self.state.write().session_expires_at_ms = Some(epoch_ms);
    }

    fn clear_session_expiry(&self) {
        self.state.write().session_expires_at_ms = None;
    }

    fn is_admin(&self) -> bool {
        self.state.read().is_admin
    }

    fn set_is_admin(&self, is_admin: bool) {
        self.state.write().is_admin = is_admin;
    }
}

/// JSON-document store backed by a file.
///
/// The document is cached in memory and written through on every mutation.
/// Read and write failures are absorbed with a diagnostic; the store then
/// behaves as an empty one.
pub struct FileCredentialStore {
    path: PathBuf,
    state: RwLock<StoredState>,
}

impl FileCredentialStore {
    /// Open a store at `path`, loading any existing document.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::load(&path);
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    fn load(path: &Path) -> StoredState {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(state) => state,
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Malformed credential file; starting empty"
                    );
                    StoredState::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => StoredState::default(),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to read credential file; starting empty"
                );
                StoredState::default()
            }
        }
    }

    fn persist(&self, state: &StoredState) {
        let json = match serde_json::to_string_pretty(state) {
            Ok(json) => json,
            Err(error) => {
                warn!(error = %error, "Failed to encode credential file");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(error) = std::fs::create_dir_all(parent) {
                    warn!(
                        path = %self.path.display(),
                        error = %error,
                        "Failed to create credential directory"
                    );
                    return;
                }
            }
        }

        if let Err(error) = std::fs::write(&self.path, json) {
            warn!(
                path = %self.path.display(),
                error = %error,
                "Failed to write credential file"
            );
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn credentials(&self) -> Credentials {
        self.state.read().credentials()
    }

    fn update(&self, update: CredentialUpdate) {
        let mut state = self.state.write();
        state.apply(update);
        self.persist(&state);
    }

    fn clear(&self) {
        let mut state = self.state.write();
        state.access_token = None;
        state.refresh_token = None;
        self.persist(&state);
    }

    fn session_expiry(&self) -> Option<i64> {
        self.state.read().session_expires_at_ms
    }

    fn set_session_expiry(&self, epoch_ms: i64) {
        let mut state = self.state.write();
        state.session_expires_at_ms = Some(epoch_ms);
        self.persist(&state);
    }

    fn clear_session_expiry(&self) {
        let mut state = self.state.write();
        state.session_expires_at_ms = None;
        self.persist(&state);
    }

    fn is_admin(&self) -> bool {
        self.state.read().is_admin
    }

    fn set_is_admin(&self, is_admin: bool) {
        let mut state = self.state.write();
        state.is_admin = is_admin;
        self.persist(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.credentials(), Credentials::default());

        store.update(CredentialUpdate::tokens("access-1", Some("refresh-1".into())));
        assert_eq!(
            store.credentials(),
            Credentials::new("access-1", "refresh-1")
        );

        // An access-only update keeps the stored refresh token.
        store.update(CredentialUpdate::tokens("access-2", None));
        let credentials = store.credentials();
        assert_eq!(credentials.access_token.as_deref(), Some("access-2"));
        assert_eq!(credentials.refresh_token.as_deref(), Some("refresh-1"));

        store.clear();
        assert_eq!(store.credentials(), Credentials::default());
    }

    #[test]
    fn test_memory_store_session_and_role_slots() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.session_expiry(), None);
        assert!(!store.is_admin());

        store.set_session_expiry(1_700_000_000_000);
        store.set_is_admin(true);
        assert_eq!(store.session_expiry(), Some(1_700_000_000_000));
        assert!(store.is_admin());

        store.clear_session_expiry();
        assert_eq!(store.session_expiry(), None);
    }

    #[test]
    fn test_file_store_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        {
            let store = FileCredentialStore::open(&path);
            store.update(CredentialUpdate::tokens("access", Some("refresh".into())));
            store.set_session_expiry(42);
            store.set_is_admin(true);
        }

        let reopened = FileCredentialStore::open(&path);
        assert_eq!(reopened.credentials(), Credentials::new("access", "refresh"));
        assert_eq!(reopened.session_expiry(), Some(42));
        assert!(reopened.is_admin());
    }

    #[test]
    fn test_file_store_malformed_document_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::open(&path);
        assert_eq!(store.credentials(), Credentials::default());
    }

    #[test]
    fn test_file_store_unwritable_path_is_silent() {
        // Parent is a file, so both reads and writes must fail - and be
        // absorbed, leaving an empty-but-usable store.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("credentials.json");

        let store = FileCredentialStore::open(&path);
        assert_eq!(store.credentials(), Credentials::default());

        store.update(CredentialUpdate::tokens("access", None));
        // The in-memory view still works even though nothing was persisted.
        assert_eq!(store.credentials().access_token.as_deref(), Some("access"));
    }
}

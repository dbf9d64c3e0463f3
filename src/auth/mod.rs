//! Token persistence and login.
//!
//! The backend issues a bearer token on login; the client keeps it in a
//! [`TokenStore`] and the HTTP layer reads it back on every request.

mod login;

pub use login::{AuthApi, LoginResponse};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ClientError, Result};

/// Persistent storage for the auth token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session file contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub email: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Token store backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_session(&self) -> Result<Option<StoredSession>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let session = serde_json::from_str(&raw).map_err(|e| {
            ClientError::Session(format!(
                "failed to parse session file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(session))
    }

    pub fn save_session(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.read_session()?.map(|session| session.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        let email = self.read_session().ok().flatten().and_then(|s| s.email);
        self.save_session(&StoredSession {
            token: token.to_string(),
            email,
            saved_at: Utc::now(),
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_no_token() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("session.json"));

        store.save("token-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-1"));

        store.save("token-2").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("token-2"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn saving_a_token_keeps_the_session_email() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));
        store
            .save_session(&StoredSession {
                token: "old".into(),
                email: Some("owner@ecogest.test".into()),
                saved_at: Utc::now(),
            })
            .unwrap();

        store.save("new").unwrap();
        let session = store.read_session().unwrap().unwrap();
        assert_eq!(session.token, "new");
        assert_eq!(session.email.as_deref(), Some("owner@ecogest.test"));
    }

    #[test]
    fn corrupt_session_file_is_a_session_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileTokenStore::new(path);
        assert!(matches!(store.load(), Err(ClientError::Session(_))));
    }

    #[test]
    fn memory_store() {
        let store = MemoryTokenStore::default();
        assert_eq!(store.load().unwrap(), None);
        store.save("t").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("t"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(
            MemoryTokenStore::with_token("x").load().unwrap().as_deref(),
            Some("x")
        );
    }
}

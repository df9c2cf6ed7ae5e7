//! Session-scoped key-value persistence for the reader.
//!
//! This module exposes the storage port the sidebar uses to carry its scroll
//! offset across page opens, along with an in-memory implementation (the
//! application default: one process is one session) and a JSON-backed
//! implementation for one-shot embeddings and tests.

use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Environment variable controlling the session file location.
pub const SESSION_PATH_ENV: &str = "TOME_SESSION_PATH";

/// Default filename for the persisted session store.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Errors surfaced by session store operations.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// I/O failure while reading or writing the session file.
    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stored session value plus write metadata.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct StoredSessionValue {
    /// Persisted value. Values are plain strings; callers parse them.
    pub value: String,
    /// Last time the value was written.
    #[serde(with = "ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    entries: BTreeMap<String, StoredSessionValue>,
}

impl SessionFile {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|stored| stored.value.clone())
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(
            key.to_string(),
            StoredSessionValue {
                value,
                updated_at: Utc::now(),
            },
        );
    }

    fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }
}

/// Shared trait implemented by session persistence backends.
///
/// The store holds ephemeral per-session values keyed by fixed names. All
/// three operations are infallible for the in-memory backend; the JSON
/// backend surfaces I/O problems through [`SessionStoreError`].
pub trait SessionStore: Send + Sync {
    /// Retrieve the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError>;

    /// Store or replace the value under `key`.
    fn set(&self, key: &str, value: String) -> Result<(), SessionStoreError>;

    /// Delete the value under `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str) -> Result<(), SessionStoreError>;
}

/// JSON-backed session store persisted on disk.
///
/// Used when a session must outlive the process, e.g. driving the reader
/// once per page from a script. Every mutation is written through so a
/// consumed key stays consumed for the next invocation.
pub struct JsonSessionStore {
    path: PathBuf,
    entries: Mutex<SessionFile>,
}

impl JsonSessionStore {
    /// Create a new store at the provided path (or the default path when omitted).
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Result<Self, SessionStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde_path(path),
            None => default_session_path(),
        };

        let file = load_session_file(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            entries: Mutex::new(file),
        })
    }

    /// Initialize a store using the default settings.
    pub fn with_defaults() -> Result<Self, SessionStoreError> {
        Self::new(None::<PathBuf>)
    }

    /// Access the underlying session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_locked(&self, session_file: &SessionFile) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session_file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let entries = self.entries.lock().expect("session lock poisoned");
        Ok(entries.get(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().expect("session lock poisoned");
        entries.set(key, value);
        self.save_locked(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().expect("session lock poisoned");
        if entries.remove(key) {
            return self.save_locked(&entries);
        }
        Ok(())
    }
}

/// In-memory session store. The application default: values live exactly as
/// long as the process, which is the reader's session.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<SessionFile>,
}

impl InMemorySessionStore {
    /// Create an empty in-memory session store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionStoreError> {
        let entries = self.entries.lock().expect("session lock poisoned");
        Ok(entries.get(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().expect("session lock poisoned");
        entries.set(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().expect("session lock poisoned");
        entries.remove(key);
        Ok(())
    }
}

fn expand_tilde_path(path: PathBuf) -> PathBuf {
    if let Some(first) = path.components().next()
        && first.as_os_str() != "~"
    {
        return path;
    }

    let input = path.to_string_lossy();
    let trimmed = input.trim();

    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }

    if let Some(rest) = trimmed.strip_prefix("~\\") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }

    PathBuf::from(trimmed)
}

fn default_session_path() -> PathBuf {
    if let Ok(path) = env::var(SESSION_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde_path(PathBuf::from(path));
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tome")
        .join(SESSION_FILE_NAME)
}

fn load_session_file(path: &Path) -> Result<SessionFile, SessionStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<SessionFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!("Failed to parse session file at {}: {}", path.display(), error);
                Ok(SessionFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(SessionFile::default()),
        Err(error) => Err(SessionStoreError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn in_memory_store_round_trip() {
        let store = InMemorySessionStore::new();
        assert!(store.get("sidebar-scroll").unwrap().is_none());

        store.set("sidebar-scroll", "42".to_string()).unwrap();
        assert_eq!(store.get("sidebar-scroll").unwrap().as_deref(), Some("42"));

        store.set("sidebar-scroll", "7".to_string()).unwrap();
        assert_eq!(store.get("sidebar-scroll").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn remove_deletes_entry_and_tolerates_missing_keys() {
        let store = InMemorySessionStore::new();
        store.set("key", "value".to_string()).unwrap();
        store.remove("key").unwrap();
        assert!(store.get("key").unwrap().is_none());

        // A second remove is a no-op rather than an error.
        store.remove("key").unwrap();
    }

    #[test]
    fn json_store_persists_across_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonSessionStore::new(Some(path.clone())).unwrap();
        store.set("sidebar-scroll", "120".to_string()).unwrap();

        drop(store);
        let store_reloaded = JsonSessionStore::new(Some(path)).unwrap();
        assert_eq!(store_reloaded.get("sidebar-scroll").unwrap().as_deref(), Some("120"));
    }

    #[test]
    fn json_store_remove_is_written_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = JsonSessionStore::new(Some(path.clone())).unwrap();
        store.set("sidebar-scroll", "120".to_string()).unwrap();
        store.remove("sidebar-scroll").unwrap();

        drop(store);
        let store_reloaded = JsonSessionStore::new(Some(path)).unwrap();
        assert!(store_reloaded.get("sidebar-scroll").unwrap().is_none());
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/session.json";
        temp_env::with_var(SESSION_PATH_ENV, Some(override_path), || {
            let path = default_session_path();
            let expected = expand_tilde_path(PathBuf::from(override_path));
            assert_eq!(path, expected);
        });
    }

    #[test]
    fn invalid_json_returns_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonSessionStore::new(Some(path)).unwrap();
        assert!(store.get("sidebar-scroll").unwrap().is_none());
    }
}

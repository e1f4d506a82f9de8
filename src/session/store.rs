//! Session store
//!
//! Holds the bearer token and the cached user profile on top of a
//! [`KeyValueStore`]. Readers never fail: backend errors are logged and
//! read as absent. Writers surface backend errors.

use super::backend::{FileStore, KeyValueStore, MemoryStore};
use super::error::SessionResult;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// Storage key of the raw bearer token
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key of the serialized user profile
pub const USER_KEY: &str = "user_data";

/// Snapshot of the client-local authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user_profile: Option<Map<String, Value>>,
}

impl Session {
    /// A session without a non-empty token is unauthenticated, cached profile or not
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Token and profile storage shared by every request a client makes
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Session that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Session persisted to a JSON file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)))
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Failed to read session value: {}", e);
                None
            }
        }
    }

    /// Persisted token, if any
    pub fn get_token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    /// Persist a token, replacing any previous one
    pub fn set_token(&self, token: &str) -> SessionResult<()> {
        self.backend.set_item(TOKEN_KEY, token)
    }

    /// Remove both the token and the cached profile
    ///
    /// Both removals are attempted even if the first one fails.
    pub fn clear_token(&self) -> SessionResult<()> {
        let token = self.backend.remove_item(TOKEN_KEY);
        let user = self.backend.remove_item(USER_KEY);
        token.and(user)
    }

    /// Cached profile; absent when missing or not a JSON object
    pub fn get_user_data(&self) -> Option<Map<String, Value>> {
        let raw = self.read(USER_KEY)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(profile)) => Some(profile),
            Ok(_) => {
                tracing::warn!("Cached user profile is not an object, ignoring");
                None
            }
            Err(e) => {
                tracing::warn!("Cached user profile is malformed: {}", e);
                None
            }
        }
    }

    /// Serialize and persist a profile
    pub fn set_user_data(&self, profile: &Map<String, Value>) -> SessionResult<()> {
        let serialized = serde_json::to_string(profile)?;
        self.backend.set_item(USER_KEY, &serialized)
    }

    /// Remove only the cached profile
    pub fn clear_user_data(&self) -> SessionResult<()> {
        self.backend.remove_item(USER_KEY)
    }

    /// Current token and profile
    pub fn session(&self) -> Session {
        Session {
            token: self.get_token(),
            user_profile: self.get_user_data(),
        }
    }

    /// An empty token is stored as given but never counts as a session
    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn profile(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_token_roundtrip() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get_token(), None);

        for token in ["abc", "eyJhbGciOiJIUzI1NiJ9.e30.sig", "with spaces"] {
            store.set_token(token).unwrap();
            assert_eq!(store.get_token().as_deref(), Some(token));
        }
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let store = SessionStore::in_memory();
        store.set_token("").unwrap();

        assert_eq!(store.get_token().as_deref(), Some(""));
        assert!(!store.is_authenticated());
        assert!(!store.session().is_authenticated());
    }

    #[test]
    fn test_clear_removes_token_and_profile() {
        let store = SessionStore::in_memory();
        store.set_token("abc").unwrap();
        store
            .set_user_data(&profile(json!({"role": "distributor"})))
            .unwrap();
        assert!(store.is_authenticated());

        store.clear_token().unwrap();
        assert_eq!(store.get_token(), None);
        assert_eq!(store.get_user_data(), None);
        assert!(!store.is_authenticated());
        assert_eq!(store.session(), Session::default());
    }

    #[test]
    fn test_profile_without_token_is_unauthenticated() {
        let store = SessionStore::in_memory();
        store
            .set_user_data(&profile(json!({"full_name": "Jane Doe"})))
            .unwrap();

        let session = store.session();
        assert!(session.user_profile.is_some());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_malformed_profile_reads_absent() {
        let backend = Arc::new(MemoryStore::new());
        let store = SessionStore::new(backend.clone());

        backend.set_item(USER_KEY, "{not json").unwrap();
        assert_eq!(store.get_user_data(), None);

        backend.set_item(USER_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(store.get_user_data(), None);
    }

    #[test]
    fn test_file_session_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::file(&path);
        store.set_token("persisted").unwrap();
        store
            .set_user_data(&profile(json!({"email": "jane@example.com"})))
            .unwrap();

        let reloaded = SessionStore::file(&path);
        assert_eq!(reloaded.get_token().as_deref(), Some("persisted"));
        assert_eq!(
            reloaded.get_user_data().unwrap()["email"],
            json!("jane@example.com")
        );
    }
}

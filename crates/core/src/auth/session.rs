use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::warn;

use crate::errors::CoreError;
use super::token_store::TokenStore;

/// Header carrying the token. The backend does not use `Authorization`.
pub const AUTH_HEADER: &str = "token";

/// Holder of the current auth token.
///
/// Built once at startup and shared (behind an `Arc`) with the API client.
/// The in-memory token wins; when it is empty the persisted token is read
/// lazily on first use.
pub struct AuthSession {
    store: Box<dyn TokenStore>,
    key: String,
    token: Mutex<String>,
}

impl AuthSession {
    pub fn new(store: Box<dyn TokenStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            token: Mutex::new(String::new()),
        }
    }

    /// Session that starts with a static token already in memory (nothing is persisted).
    pub fn with_token(store: Box<dyn TokenStore>, key: impl Into<String>, token: impl Into<String>) -> Self {
        let session = Self::new(store, key);
        *session.token.lock().unwrap_or_else(|e| e.into_inner()) = token.into();
        session
    }

    /// Current token, falling back to persisted storage when memory is empty.
    /// Returns an empty string when no token exists anywhere.
    pub fn token(&self) -> String {
        let mut token = self.token.lock().unwrap_or_else(|e| e.into_inner());
        if token.is_empty() {
            match self.store.get(&self.key) {
                Ok(Some(stored)) => *token = stored,
                Ok(None) => {}
                Err(e) => warn!("Could not read persisted token: {e}"),
            }
        }
        token.clone()
    }

    pub fn has_token(&self) -> bool {
        !self.token().is_empty()
    }

    /// Replace the token in memory and persist it.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), CoreError> {
        let token = token.into();
        {
            let mut current = self.token.lock().unwrap_or_else(|e| e.into_inner());
            current.clone_from(&token);
        }
        self.store.set(&self.key, &token)
    }

    /// Forget the token in memory and in storage (logout).
    pub fn clear_token(&self) -> Result<(), CoreError> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.store.remove(&self.key)
    }

    /// `{"token": <value>}`, or an empty map without a token.
    pub fn auth_headers(&self) -> BTreeMap<String, String> {
        let token = self.token();
        let mut headers = BTreeMap::new();
        if !token.is_empty() {
            headers.insert(AUTH_HEADER.to_string(), token);
        }
        headers
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_token = !self.token.lock().unwrap_or_else(|e| e.into_inner()).is_empty();
        f.debug_struct("AuthSession")
            .field("key", &self.key)
            .field("token_loaded", &has_token)
            .finish()
    }
}

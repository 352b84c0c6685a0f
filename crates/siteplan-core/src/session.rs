//! Client session state.
//!
//! The session (auth token plus the logged-in user's profile) is owned by a
//! `SessionState` value that the application creates once and passes to
//! whatever needs it. Persistence goes through an injected `SessionStore`,
//! a small key-value interface, so tests run against `MemorySessionStore`
//! and the CLI against a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Store key holding the auth token
pub const TOKEN_KEY: &str = "ff_token";

/// Store key holding the JSON-encoded user profile
pub const USER_KEY: &str = "ff_infoUser";

/// UI selections dropped together with the session on logout
pub const LOGOUT_KEYS: &[&str] = &["ff_projectsInfo", "ff_teamId", "ff_navBarSelection"];

/// Session persistence error
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Login rejected: {0}")]
    InvalidLogin(String),
}

/// Key-value persistence for session data
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// Volatile store, for tests and embedding
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySessionStore {
    entries: BTreeMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Profile of the logged-in user, as persisted under `ff_infoUser`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Profile picture URL
    pub url: String,
    pub users_permissions_id: i64,
    pub users_roles_id: i64,
    pub company_id: i64,
    #[serde(rename = "sprintIdAtiva")]
    pub active_sprint_id: i64,
    pub plan: i64,
}

/// Token and user of the current client session
#[derive(Debug)]
pub struct SessionState<S: SessionStore> {
    store: S,
    token: Option<String>,
    user: Option<UserProfile>,
}

impl<S: SessionStore> SessionState<S> {
    /// Restore whatever the store holds.
    ///
    /// A user entry that does not decode is treated as absent.
    pub fn init(store: S) -> Result<Self, SessionError> {
        let token = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let user = match store.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "discarding unreadable stored user profile");
                    None
                }
            },
            None => None,
        };
        debug!(has_token = token.is_some(), has_user = user.is_some(), "session restored");
        Ok(Self { store, token, user })
    }

    /// Anonymous session over an empty store
    pub fn anonymous(store: S) -> Self {
        Self {
            store,
            token: None,
            user: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// `Authorization` header value for API requests
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    /// Record a successful login and persist it
    pub fn login(&mut self, token: impl Into<String>, user: UserProfile) -> Result<(), SessionError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SessionError::InvalidLogin("empty auth token".into()));
        }
        if user.email.trim().is_empty() {
            return Err(SessionError::InvalidLogin("user profile has no email".into()));
        }

        self.store.set(TOKEN_KEY, &token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        debug!(user_id = user.id, "session opened");
        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// Apply local profile edits; `false` when nobody is logged in
    pub fn update_user(&mut self, edit: impl FnOnce(&mut UserProfile)) -> Result<bool, SessionError> {
        let Some(user) = self.user.as_mut() else {
            return Ok(false);
        };
        edit(user);
        let encoded = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &encoded)?;
        Ok(true)
    }

    /// Clear the session and every UI selection tied to it
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        for key in LOGOUT_KEYS {
            self.store.remove(key)?;
        }
        self.token = None;
        self.user = None;
        debug!("session closed");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

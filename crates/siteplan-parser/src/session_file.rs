//! Session store backed by a single JSON object file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use siteplan_core::session::{SessionError, SessionStore};

/// Keeps session entries as a flat JSON object on disk.
///
/// Every write rewrites the whole file; the file is removed once the last
/// entry is gone.
#[derive(Clone, Debug)]
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if entries.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl SessionStore for JsonFileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteplan_core::session::{SessionState, UserProfile, TOKEN_KEY};

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let mut session = SessionState::anonymous(JsonFileSessionStore::new(&path));
        let user = UserProfile {
            id: 1,
            email: "eng@example.com".into(),
            ..Default::default()
        };
        session.login("tok", user).unwrap();
        assert!(path.exists());

        let reopened = SessionState::init(JsonFileSessionStore::new(&path)).unwrap();
        assert!(reopened.is_logged_in());
        assert_eq!(reopened.token(), Some("tok"));
    }

    #[test]
    fn logout_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = JsonFileSessionStore::new(&path);
        store.set(TOKEN_KEY, "x").unwrap();

        let mut session = SessionState::init(store).unwrap();
        session.logout().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let store = JsonFileSessionStore::new(&path);
        assert!(matches!(store.get(TOKEN_KEY), Err(SessionError::Json(_))));
    }
}

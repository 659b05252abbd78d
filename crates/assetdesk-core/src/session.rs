//! Session token storage.
//!
//! The token lives in `${ASSETDESK_HOME}/session.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Storage for the current authentication token.
///
/// The auth controller is the only writer; the API client only reads.
pub trait SessionStore: Send + Sync {
    /// Returns the stored token, if any.
    fn get(&self) -> Result<Option<String>>;

    /// Replaces the stored token.
    fn set(&self, token: &str) -> Result<()>;

    /// Removes the stored token. Returns whether one was present.
    fn clear(&self) -> Result<bool>;
}

/// Shared handle passed to the API client and auth controller.
pub type SharedSession = Arc<dyn SessionStore>;

/// On-disk layout of the session file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store at the default location under `ASSETDESK_HOME`.
    pub fn new() -> Self {
        Self::at(paths::session_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    fn save(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(file).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut handle = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            handle
                .write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(normalize(self.load()?.token))
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut file = self.load().unwrap_or_default();
        file.token = Some(token.trim().to_string());
        self.save(&file)
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut file = self.load().unwrap_or_default();
        let had_token = normalize(file.token.take()).is_some();
        self.save(&file)?;
        Ok(had_token)
    }
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow::anyhow!("session lock poisoned"))?;
        Ok(normalize(guard.clone()))
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow::anyhow!("session lock poisoned"))?;
        *guard = Some(token.trim().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_poisoned| anyhow::anyhow!("session lock poisoned"))?;
        Ok(normalize(guard.take()).is_some())
    }
}

/// Blank tokens count as no token.
fn normalize(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 12 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::at(dir.path().join("session.json"));

        assert_eq!(store.get().unwrap(), None);
        store.set("token-123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("token-123"));

        // A fresh handle sees the persisted value.
        let reopened = FileSessionStore::at(store.path());
        assert_eq!(reopened.get().unwrap().as_deref(), Some("token-123"));
    }

    #[test]
    fn test_file_store_clear_reports_presence() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::at(dir.path().join("session.json"));

        assert!(!store.clear().unwrap());
        store.set("token-123").unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::at(dir.path().join("nested").join("session.json"));
        store.set("abc").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_blank_token_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"token": "   "}"#).unwrap();

        let store = FileSessionStore::at(&path);
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::at(&path);
        assert!(store.get().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let store = FileSessionStore::at(dir.path().join("session.json"));
        store.set("secret-token").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get().unwrap(), None);
        store.set("t").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("t"));
        assert!(store.clear().unwrap());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbGci...");
    }
}

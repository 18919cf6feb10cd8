//! Persisted session state shared by every outgoing request

use agency_core::{Error, Result, Session, User, config::SessionConfig};
use parking_lot::RwLock;
use std::{collections::BTreeMap, fmt, path::PathBuf, sync::Arc};
use tracing::{debug, warn};

/// Key/value storage backing the session, the local-storage analogue
pub trait SessionStorage: Send + Sync + fmt::Debug {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile storage, used by tests and one-shot processes
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in a single file
///
/// Every write rewrites the file, so a crash never leaves the token and the
/// user out of step for longer than one call.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the file, starting empty if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| Error::Storage {
                    key: path.display().to_string(),
                    message: format!("corrupt session file: {e}"),
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened session storage at {}", path.display());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Process-wide session handle: the serialized user and the raw token
///
/// Cloning is cheap; every clone sees the same storage.
#[derive(Debug, Clone)]
pub struct SessionHolder {
    storage: Arc<dyn SessionStorage>,
    user_key: String,
    token_key: String,
}

impl SessionHolder {
    /// Wrap a storage backend using the configured key names
    pub fn new(storage: Arc<dyn SessionStorage>, config: &SessionConfig) -> Self {
        Self {
            storage,
            user_key: config.user_key.clone(),
            token_key: config.token_key.clone(),
        }
    }

    /// Volatile session with default key names
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), &SessionConfig::default())
    }

    /// Open a file-backed session as configured
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but cannot be read.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let storage = FileStorage::open(config.storage_path.clone())?;
        Ok(Self::new(Arc::new(storage), config))
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.storage
            .get(&self.token_key)
            .filter(|token| !token.is_empty())
    }

    /// Current user, if one is stored and parses
    pub fn user(&self) -> Option<User> {
        let raw = self.storage.get(&self.user_key)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Ignoring unreadable stored user: {}", e);
                None
            }
        }
    }

    /// Full session when both halves are present
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// Persist a new session, replacing any previous one
    ///
    /// The token is written before the user, so a stored user always has its
    /// token. If the user write fails the session is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be written.
    pub fn set(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.storage.set(&self.token_key, &session.token)?;
        if let Err(e) = self.storage.set(&self.user_key, &user) {
            warn!("Storing user failed, clearing session: {}", e);
            if let Err(cleanup) = self.clear() {
                warn!("Session cleanup failed: {}", cleanup);
            }
            return Err(e);
        }
        debug!("Session stored for {}", session.user.email);
        Ok(())
    }

    /// Remove the user and the token
    ///
    /// Both keys are always attempted; the first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if either key cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let user = self.storage.remove(&self.user_key);
        let token = self.storage.remove(&self.token_key);
        user.and(token)
    }
}

//! Persistent slot for the session credential.
//!
//! Mirrors a pair of browser cookies: one slot, two tokens, each with its
//! own expiry. Expiry is enforced by [`Credential`] accessors, so a store
//! only has to keep bytes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::credential::Credential;
use crate::error::NetwError;

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, NetwError>;

    fn save(&self, credential: &Credential) -> Result<(), NetwError>;

    fn clear(&self) -> Result<(), NetwError>;
}

/// Process-local slot, used by tests and one-shot invocations
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, NetwError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| NetwError::storage("credential slot lock poisoned"))?;
        Ok(slot.clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), NetwError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| NetwError::storage("credential slot lock poisoned"))?;
        *slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), NetwError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| NetwError::storage("credential slot lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// JSON file slot, survives between CLI invocations
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, NetwError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| NetwError::storage("credential file lock poisoned"))?;

        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| NetwError::storage(format!("{}: {}", self.path.display(), e)))?;

        // A corrupt slot reads as logged out, like an unreadable cookie
        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                warn!("Ignoring unreadable credential file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), NetwError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| NetwError::storage("credential file lock poisoned"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| NetwError::storage(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(credential)
            .map_err(|e| NetwError::storage(e.to_string()))?;
        fs::write(&self.path, content)
            .map_err(|e| NetwError::storage(format!("{}: {}", self.path.display(), e)))
    }

    fn clear(&self) -> Result<(), NetwError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| NetwError::storage("credential file lock poisoned"))?;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NetwError::storage(format!("{}: {}", self.path.display(), e))),
        }
    }
}

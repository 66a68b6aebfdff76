//! On-device key-value state
//!
//! Holds the UI state that survives restarts: the theme preference and the
//! signed-in session. The state is persisted as TOML and rehydrated when the
//! manager is created.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, StorageError};
use crate::theme::ThemePreference;
use crate::types::User;

/// Persisted local state
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocalState {
    #[serde(default)]
    pub theme: Option<ThemePreference>,

    #[serde(default)]
    pub session: Option<User>,
}

/// Thread-safe handle to the local state file
#[derive(Clone)]
pub struct LocalStateManager {
    state_file: PathBuf,
    state: Arc<RwLock<LocalState>>,
}

impl LocalStateManager {
    /// Open the state file, loading it if it exists
    pub fn open(state_file: impl Into<PathBuf>) -> Result<Self> {
        let manager = Self {
            state_file: state_file.into(),
            state: Arc::new(RwLock::new(LocalState::default())),
        };
        manager.load()?;
        Ok(manager)
    }

    pub fn path(&self) -> &Path {
        &self.state_file
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> LocalState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mutate the state and write it back to disk
    pub fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut LocalState),
    {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            mutate(&mut state);
        }
        self.save()
    }

    fn load(&self) -> Result<()> {
        if !self.state_file.exists() {
            tracing::debug!(path = %self.state_file.display(), "no local state yet");
            return Ok(());
        }

        let content = std::fs::read_to_string(&self.state_file).map_err(StorageError::Io)?;
        let loaded: LocalState = toml::from_str(&content).map_err(StorageError::Parse)?;

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = loaded;
        tracing::debug!(path = %self.state_file.display(), "local state rehydrated");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.state_file.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }

        let content = toml::to_string_pretty(&self.snapshot()).map_err(StorageError::Serialize)?;
        std::fs::write(&self.state_file, content).map_err(StorageError::Io)?;

        #[cfg(unix)]
        {
            // The session names the signed-in user
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.state_file, permissions).map_err(StorageError::Io)?;
        }

        Ok(())
    }
}

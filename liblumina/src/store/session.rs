//! Stores persisted in local state

use crate::error::Result;
use crate::local_state::LocalStateManager;
use crate::theme::{palette_for, Palette, ThemePreference};
use crate::types::User;

/// The signed-in user, if any
#[derive(Clone)]
pub struct SessionStore {
    state: LocalStateManager,
}

impl SessionStore {
    pub fn new(state: LocalStateManager) -> Self {
        Self { state }
    }

    pub fn current(&self) -> Option<User> {
        self.state.snapshot().session
    }

    pub fn set(&self, user: User) -> Result<()> {
        self.state.update(|state| state.session = Some(user))
    }

    pub fn clear(&self) -> Result<()> {
        self.state.update(|state| state.session = None)
    }
}

/// Light/dark preference, rehydrated from local state
#[derive(Clone)]
pub struct ThemeStore {
    state: LocalStateManager,
}

impl ThemeStore {
    pub fn new(state: LocalStateManager) -> Self {
        Self { state }
    }

    /// The stored preference, or light when none was ever chosen
    pub fn preference(&self) -> ThemePreference {
        self.state.snapshot().theme.unwrap_or_default()
    }

    pub fn set(&self, preference: ThemePreference) -> Result<()> {
        self.state.update(|state| state.theme = Some(preference))
    }

    /// Flip between light and dark, returning the new preference
    pub fn toggle(&self) -> Result<ThemePreference> {
        let next = self.preference().toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn palette(&self) -> Palette {
        palette_for(self.preference())
    }
}

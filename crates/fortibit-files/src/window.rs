// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-window record held by the file manager.

use std::path::PathBuf;

use fortibit_core::{FortibitError, SecureStorage, WindowId, WindowState};
use fortibit_vault::{ObfuscatedKey, ObfuscatedSecret, SessionKey, create_session_key};
use tokio::time::Instant;
use zeroize::Zeroizing;

/// One row of the window table: at most one file and one password per window.
#[derive(Debug)]
pub struct WindowEntry {
    pub(crate) state: WindowState,
    pub(crate) file: Option<PathBuf>,
    pub(crate) password: Option<ObfuscatedSecret>,
    pub(crate) key: ObfuscatedKey,
    pub(crate) last_activity: Instant,
}

impl WindowEntry {
    pub(crate) fn new(storage: &dyn SecureStorage) -> Result<Self, FortibitError> {
        Ok(Self {
            state: WindowState::NoFile,
            file: None,
            password: None,
            key: fresh_key(storage)?,
            last_activity: Instant::now(),
        })
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn file(&self) -> Option<&PathBuf> {
        self.file.as_ref()
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub(crate) fn session_key(&self, storage: &dyn SecureStorage) -> Result<SessionKey, FortibitError> {
        self.key.reveal(storage)
    }

    pub(crate) fn password(
        &self,
        storage: &dyn SecureStorage,
    ) -> Result<Option<Zeroizing<String>>, FortibitError> {
        self.password.as_ref().map(|p| p.reveal(storage)).transpose()
    }

    pub(crate) fn set_password(
        &mut self,
        password: &str,
        storage: &dyn SecureStorage,
    ) -> Result<(), FortibitError> {
        self.password = Some(ObfuscatedSecret::obfuscate(password, storage)?);
        Ok(())
    }

    /// Point the window at `file`, forgetting any password.
    pub(crate) fn select_file(&mut self, file: PathBuf) {
        self.file = Some(file);
        self.password = None;
        self.state = WindowState::FileSelected;
    }

    /// Forget the password and replace the session key; the file stays.
    pub(crate) fn lock(&mut self, storage: &dyn SecureStorage) -> Result<(), FortibitError> {
        self.password = None;
        self.key = fresh_key(storage)?;
        self.state = WindowState::Locked;
        Ok(())
    }

    /// Back to an empty window.
    pub(crate) fn reset(&mut self, storage: &dyn SecureStorage) -> Result<(), FortibitError> {
        self.file = None;
        self.password = None;
        self.key = fresh_key(storage)?;
        self.state = WindowState::NoFile;
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

fn fresh_key(storage: &dyn SecureStorage) -> Result<ObfuscatedKey, FortibitError> {
    let key = create_session_key()?;
    ObfuscatedKey::obfuscate(&key, storage)
}

/// A lock transition, published to subscribers of the file manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    pub window: WindowId,
    pub reason: LockReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    Explicit,
    Idle,
    SystemLock,
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for file-manager integration tests.
//!
//! `TestHarness` owns a temp directory holding both the app data directory
//! and a place for vault files, plus a configuration pointing at it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fortibit_config::model::{AppConfig, FortibitConfig, LockConfig};
use fortibit_core::FortibitError;

use crate::dialog::ScriptedDialog;
use crate::storage::MemoryStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    idle_seconds: u64,
    save_on_lock: bool,
    max_recent_files: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            idle_seconds: 0,
            save_on_lock: false,
            max_recent_files: 10,
        }
    }

    /// Enable the idle lock.
    pub fn with_idle_seconds(mut self, secs: u64) -> Self {
        self.idle_seconds = secs;
        self
    }

    pub fn with_save_on_lock(mut self) -> Self {
        self.save_on_lock = true;
        self
    }

    pub fn with_max_recent_files(mut self, max: usize) -> Self {
        self.max_recent_files = max;
        self
    }

    pub fn build(self) -> Result<TestHarness, FortibitError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| FortibitError::io(std::env::temp_dir(), e))?;
        let data_dir = temp_dir.path().join("data");
        let vault_dir = temp_dir.path().join("vaults");
        std::fs::create_dir_all(&vault_dir).map_err(|e| FortibitError::io(&vault_dir, e))?;

        let config = FortibitConfig {
            app: AppConfig {
                data_dir: data_dir.to_string_lossy().to_string(),
                max_recent_files: self.max_recent_files,
                ..AppConfig::default()
            },
            lock: LockConfig {
                idle_seconds: self.idle_seconds,
                save_on_lock: self.save_on_lock,
                ..LockConfig::default()
            },
            ..FortibitConfig::default()
        };

        Ok(TestHarness {
            dialog: Arc::new(ScriptedDialog::new()),
            storage: Arc::new(MemoryStorage::new()),
            config,
            vault_dir,
            data_dir,
            _temp_dir: temp_dir,
        })
    }
}

/// A temp directory plus the collaborators a file manager needs.
pub struct TestHarness {
    pub dialog: Arc<ScriptedDialog>,
    pub storage: Arc<MemoryStorage>,
    pub config: FortibitConfig,
    vault_dir: PathBuf,
    data_dir: PathBuf,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Path of a vault file named `name` inside the harness directory.
    pub fn vault_path(&self, name: &str) -> PathBuf {
        self.vault_dir.join(name)
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

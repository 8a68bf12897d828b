// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File "dialogs" for the command line.
//!
//! Paths come from command arguments. A command queues the path it was given
//! before calling into the file manager; a dialog with nothing queued counts
//! as cancelled.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use fortibit_core::{DialogOutcome, FileDialogProvider, FileFilter, FortibitError, WindowId};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ArgumentDialog {
    queued: Mutex<VecDeque<PathBuf>>,
}

impl ArgumentDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next dialog with `path`.
    pub fn queue(&self, path: impl Into<PathBuf>) -> Result<(), FortibitError> {
        self.queued
            .lock()
            .map_err(|_| FortibitError::Internal("dialog queue poisoned".to_string()))?
            .push_back(path.into());
        Ok(())
    }

    fn next(&self, window: WindowId, filters: &[FileFilter]) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        let next = self
            .queued
            .lock()
            .map_err(|_| FortibitError::Internal("dialog queue poisoned".to_string()))?
            .pop_front();
        debug!(
            window_id = %window,
            filter = filters.first().map(|f| f.name.as_str()).unwrap_or_default(),
            answered = next.is_some(),
            "dialog requested"
        );
        Ok(next.map_or(DialogOutcome::Cancelled, DialogOutcome::Selected))
    }
}

#[async_trait]
impl FileDialogProvider for ArgumentDialog {
    async fn show_open_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        self.next(window, filters)
    }

    async fn show_save_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        self.next(window, filters)
    }
}

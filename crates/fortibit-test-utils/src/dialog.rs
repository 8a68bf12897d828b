// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted file dialog for deterministic testing.

use std::collections::VecDeque;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fortibit_core::{DialogOutcome, FileDialogProvider, FileFilter, FortibitError, WindowId};

/// Which dialog was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Open,
    Save,
}

/// A file dialog that pops pre-configured outcomes from a FIFO queue.
///
/// When the queue is empty the dialog behaves as if the user cancelled.
#[derive(Default)]
pub struct ScriptedDialog {
    outcomes: Mutex<VecDeque<DialogOutcome<PathBuf>>>,
    shown: Mutex<Vec<(DialogKind, WindowId, Vec<FileFilter>)>>,
}

impl ScriptedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a selected path.
    pub async fn select(&self, path: impl Into<PathBuf>) {
        self.outcomes
            .lock()
            .await
            .push_back(DialogOutcome::Selected(path.into()));
    }

    /// Queue a cancellation.
    pub async fn cancel(&self) {
        self.outcomes.lock().await.push_back(DialogOutcome::Cancelled);
    }

    /// Every dialog shown so far, in order.
    pub async fn shown(&self) -> Vec<(DialogKind, WindowId, Vec<FileFilter>)> {
        self.shown.lock().await.clone()
    }

    async fn next(
        &self,
        kind: DialogKind,
        window: WindowId,
        filters: &[FileFilter],
    ) -> DialogOutcome<PathBuf> {
        self.shown
            .lock()
            .await
            .push((kind, window, filters.to_vec()));
        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(DialogOutcome::Cancelled)
    }
}

#[async_trait]
impl FileDialogProvider for ScriptedDialog {
    async fn show_open_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        Ok(self.next(DialogKind::Open, window, filters).await)
    }

    async fn show_save_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        Ok(self.next(DialogKind::Save, window, filters).await)
    }
}

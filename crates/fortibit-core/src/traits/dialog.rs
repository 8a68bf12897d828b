// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File dialog collaborator used to pick vault paths.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::FortibitError;
use crate::types::{DialogOutcome, FileFilter, WindowId};

/// Native open/save dialogs, provided by the desktop shell.
///
/// Implementations return [`DialogOutcome::Cancelled`] when the user dismisses
/// the dialog; `Err` is reserved for real failures.
#[async_trait]
pub trait FileDialogProvider: Send + Sync + 'static {
    /// Ask the user to pick an existing file.
    async fn show_open_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError>;

    /// Ask the user to pick a destination path.
    async fn show_save_dialog(
        &self,
        window: WindowId,
        filters: &[FileFilter],
    ) -> Result<DialogOutcome<PathBuf>, FortibitError>;
}

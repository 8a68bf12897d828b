// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault, worker, and file manager crates.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The file extension of vault files, without the leading dot.
pub const VAULT_FILE_EXTENSION: &str = "fbit";

/// Identifies one vault window. Each window owns at most one open vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a vault entry row. Rows written by the desktop renderer use
/// numeric ids; imported rows may carry string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntryId {
    fn from(value: i64) -> Self {
        EntryId::Number(value)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId::Text(value.to_string())
    }
}

/// Lifecycle state of a vault window.
///
/// `Closed` is represented by the window's absence from the file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum WindowState {
    NoFile,
    FileSelected,
    Unlocked,
    Locked,
}

/// A filter shown by the native file dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// The filter for Fortibit vault files.
    pub fn vault() -> Self {
        Self {
            name: "Fortibit database file".to_string(),
            extensions: vec![VAULT_FILE_EXTENSION.to_string()],
        }
    }

    /// The filter for CSV reports and exports.
    pub fn csv() -> Self {
        Self {
            name: "Comma Separated Values File".to_string(),
            extensions: vec!["csv".to_string()],
        }
    }
}

/// Result of asking the user for a path. Cancelling is an ordinary outcome,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    Cancelled,
    Selected(T),
}

impl<T> DialogOutcome<T> {
    /// Returns the selected value, or `None` if the user cancelled.
    pub fn selected(self) -> Option<T> {
        match self {
            DialogOutcome::Cancelled => None,
            DialogOutcome::Selected(value) => Some(value),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DialogOutcome::Cancelled)
    }
}

/// Options for a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptions {
    /// Always ask for a new path ("save as").
    #[serde(default)]
    pub force_new: bool,
    /// Whether the UI should show a "saved" notification.
    #[serde(default = "default_notify")]
    pub notify: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            force_new: false,
            notify: default_notify(),
        }
    }
}

fn default_notify() -> bool {
    true
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The user cancelled the save dialog. Nothing was written.
    Cancelled,
    /// The vault was fully written to `file`.
    Saved { file: PathBuf, notify: bool },
    /// The save failed; the previously persisted file was left intact.
    Failed(String),
}

impl SaveOutcome {
    /// The `status` flag reported to the renderer.
    pub fn status(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

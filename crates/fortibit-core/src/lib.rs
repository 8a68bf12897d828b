// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Fortibit password vault.
//!
//! This crate provides the error taxonomy, shared identifiers, and the
//! collaborator traits (file dialogs, secure storage) used throughout the
//! workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FortibitError;
pub use types::{
    DialogOutcome, EntryId, FileFilter, SaveOptions, SaveOutcome, VAULT_FILE_EXTENSION, WindowId,
    WindowState,
};

pub use traits::{FileDialogProvider, SecureStorage};

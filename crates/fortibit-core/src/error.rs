// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Fortibit vault.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::WindowId;

/// The primary error type used across all Fortibit crates.
#[derive(Debug, Error)]
pub enum FortibitError {
    /// AEAD tag check failed: tampered ciphertext, corrupt file, or wrong key.
    ///
    /// Wrong password and corrupt file are deliberately reported the same way.
    #[error("cannot open vault: wrong password or corrupt file")]
    Authentication,

    /// Input could not be decoded (malformed base64, truncated envelope).
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Payload schema version missing or unsupported, or payload is not valid JSON.
    #[error("schema error: {0}")]
    Schema(String),

    /// The isolated worker failed to spawn, crashed, or did not reply.
    #[error("worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// File read/write/rename/copy failure.
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A breach range query failed. Scoped to a single entry.
    #[error("network error: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// The platform secure-storage provider failed to protect or reveal bytes.
    #[error("secure storage error: {0}")]
    SecureStorage(String),

    /// The file dialog collaborator failed (not cancelled -- cancel is not an error).
    #[error("file dialog error: {0}")]
    Dialog(String),

    /// The vault path is already associated with another live window.
    #[error("{} is already open in window {window}", path.display())]
    PathAlreadyOpen { path: PathBuf, window: WindowId },

    /// No window with this id is registered.
    #[error("unknown window {0}")]
    UnknownWindow(WindowId),

    /// The requested transition is not valid in the window's current state.
    #[error("window {window}: {message}")]
    InvalidState { window: WindowId, message: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FortibitError {
    /// Build an [`FortibitError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failed operation may succeed on a freshly spawned worker.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WorkerUnavailable(_))
    }

    /// The message shown to the end user.
    ///
    /// Open failures never reveal whether the password or the file was at fault.
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication | Self::Decryption(_) | Self::Schema(_) => {
                "Cannot open the vault. The password is wrong or the file is damaged.".to_string()
            }
            Self::Io { .. } => {
                "Could not save or read the vault file. The previous file was left unchanged."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

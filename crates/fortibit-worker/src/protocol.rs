// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker request/response messages.
//!
//! Both sides speak JSON with a `type` tag. Every request that touches entry
//! secrets carries the caller's session key explicitly; a worker holds no
//! state between requests.

use std::fmt;

use fortibit_breach::{BreachReport, RangeSettings};
use fortibit_core::{EntryId, FortibitError};
use fortibit_vault::{SessionKey, VaultPayload};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use zeroize::Zeroizing;

/// A secret string carried on the wire: a master password or one entry secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretText(Zeroizing<String>);

impl SecretText {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<Zeroizing<String>> for SecretText {
    fn from(value: Zeroizing<String>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SecretText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for SecretText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(Zeroizing::new(String::deserialize(deserializer)?)))
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WorkerRequest {
    /// Reveal entry secrets with the session key, then wrap under `password`.
    EncryptDatabase {
        payload: VaultPayload,
        password: SecretText,
        session_key: SessionKey,
    },
    /// Unwrap `envelope`, then re-protect entry secrets with the session key.
    DecryptDatabase {
        envelope: String,
        password: SecretText,
        session_key: SessionKey,
    },
    EncryptString {
        plain: SecretText,
        session_key: SessionKey,
    },
    DecryptString {
        encrypted: String,
        session_key: SessionKey,
    },
    /// Protect the `password` field of each imported entry row.
    BulkEncryptString {
        items: Vec<Value>,
        session_key: SessionKey,
    },
    /// Reveal the `password` field of each entry row for export.
    BulkDecryptString {
        items: Vec<Value>,
        session_key: SessionKey,
    },
    GetLeaks {
        payload: VaultPayload,
        session_key: SessionKey,
        range: RangeSettings,
    },
    GetWeakPasswords {
        payload: VaultPayload,
        session_key: SessionKey,
    },
}

impl WorkerRequest {
    /// The wire tag, safe to log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EncryptDatabase { .. } => "EncryptDatabase",
            Self::DecryptDatabase { .. } => "DecryptDatabase",
            Self::EncryptString { .. } => "EncryptString",
            Self::DecryptString { .. } => "DecryptString",
            Self::BulkEncryptString { .. } => "BulkEncryptString",
            Self::BulkDecryptString { .. } => "BulkDecryptString",
            Self::GetLeaks { .. } => "GetLeaks",
            Self::GetWeakPasswords { .. } => "GetWeakPasswords",
        }
    }
}

impl fmt::Debug for WorkerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.kind()).finish_non_exhaustive()
    }
}

/// Password strength of one entry, `0` (weakest) to `4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthReport {
    pub id: EntryId,
    pub score: u8,
}

impl StrengthReport {
    /// Scores of 2 and below are flagged to the user.
    pub fn is_weak(&self) -> bool {
        self.score <= 2
    }
}

/// Error classes that survive the trip back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerErrorKind {
    Authentication,
    Decryption,
    Schema,
    Network,
    Internal,
}

impl WorkerErrorKind {
    pub fn of(error: &FortibitError) -> Self {
        match error {
            FortibitError::Authentication => Self::Authentication,
            FortibitError::Decryption(_) => Self::Decryption,
            FortibitError::Schema(_) => Self::Schema,
            FortibitError::Network { .. } => Self::Network,
            _ => Self::Internal,
        }
    }

    /// Rebuild the host-side error.
    pub fn into_error(self, message: String) -> FortibitError {
        match self {
            Self::Authentication => FortibitError::Authentication,
            Self::Decryption => FortibitError::Decryption(message),
            Self::Schema => FortibitError::Schema(message),
            Self::Network => FortibitError::Network {
                message,
                source: None,
            },
            Self::Internal => FortibitError::Internal(message),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum WorkerResponse {
    /// Reply to `EncryptDatabase` (an envelope) and `EncryptString`.
    Encrypted { encrypted: String },
    /// Reply to `DecryptDatabase`; entry secrets are session-protected.
    Decrypted { payload: VaultPayload },
    /// Reply to `DecryptString`.
    DecryptedString { plain: SecretText },
    BulkEncrypted { items: Vec<Value> },
    BulkDecrypted { items: Vec<Value> },
    Leaks { reports: Vec<BreachReport> },
    WeakPasswords { reports: Vec<StrengthReport> },
    Error {
        kind: WorkerErrorKind,
        message: String,
    },
}

impl WorkerResponse {
    pub fn from_error(error: &FortibitError) -> Self {
        Self::Error {
            kind: WorkerErrorKind::of(error),
            message: error.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encrypted { .. } => "Encrypted",
            Self::Decrypted { .. } => "Decrypted",
            Self::DecryptedString { .. } => "DecryptedString",
            Self::BulkEncrypted { .. } => "BulkEncrypted",
            Self::BulkDecrypted { .. } => "BulkDecrypted",
            Self::Leaks { .. } => "Leaks",
            Self::WeakPasswords { .. } => "WeakPasswords",
            Self::Error { .. } => "Error",
        }
    }
}

impl fmt::Debug for WorkerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { kind, message } => f
                .debug_struct("Error")
                .field("kind", kind)
                .field("message", message)
                .finish(),
            other => f.debug_struct(other.kind()).finish_non_exhaustive(),
        }
    }
}

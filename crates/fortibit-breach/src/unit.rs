// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query units: an entry id paired with the SHA-1 of its secret.

use std::fmt;

use fortibit_core::{EntryId, FortibitError};
use sha1::{Digest, Sha1};
use zeroize::Zeroize;

/// Hex characters sent to the range endpoint.
pub const PREFIX_LEN: usize = 5;
/// Hex length of a SHA-1 digest.
pub const SHA1_HEX_LEN: usize = 40;

/// One entry to check. Only [`BreachQueryUnit::prefix`] ever leaves the process.
#[derive(Clone, PartialEq, Eq)]
pub struct BreachQueryUnit {
    id: EntryId,
    hash: String,
}

impl fmt::Debug for BreachQueryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreachQueryUnit")
            .field("id", &self.id)
            .field("prefix", &self.prefix())
            .finish_non_exhaustive()
    }
}

impl Drop for BreachQueryUnit {
    fn drop(&mut self) {
        self.hash.zeroize();
    }
}

impl BreachQueryUnit {
    /// Build a unit from a hex SHA-1 digest. The digest is upper-cased.
    pub fn from_hash(id: EntryId, hash: &str) -> Result<Self, FortibitError> {
        let hash = hash.trim();
        if hash.len() != SHA1_HEX_LEN || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FortibitError::Internal(format!(
                "entry {id}: expected a {SHA1_HEX_LEN}-character hex SHA-1 digest"
            )));
        }
        Ok(Self {
            id,
            hash: hash.to_ascii_uppercase(),
        })
    }

    /// Hash `secret` with SHA-1 and build a unit from the digest.
    pub fn from_secret(id: EntryId, secret: &str) -> Self {
        let digest = Sha1::digest(secret.as_bytes());
        Self {
            id,
            hash: hex::encode_upper(digest),
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn prefix(&self) -> &str {
        &self.hash[..PREFIX_LEN]
    }

    pub fn suffix(&self) -> &str {
        &self.hash[PREFIX_LEN..]
    }

    /// `(prefix, suffix)` of the digest.
    pub fn split(&self) -> (&str, &str) {
        self.hash.split_at(PREFIX_LEN)
    }
}

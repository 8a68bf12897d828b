// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory secure storage for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use fortibit_core::{FortibitError, SecureStorage};

const MARKER: &[u8] = b"mem:";

/// Reversible, recognisable transform: `mem:` followed by the bytes XOR-ed
/// with `0x5a`. Counts calls so tests can assert the provider was used.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    protected: AtomicUsize,
    revealed: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protect_calls(&self) -> usize {
        self.protected.load(Ordering::SeqCst)
    }

    pub fn unprotect_calls(&self) -> usize {
        self.revealed.load(Ordering::SeqCst)
    }
}

impl SecureStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>, FortibitError> {
        self.protected.fetch_add(1, Ordering::SeqCst);
        let mut out = MARKER.to_vec();
        out.extend(plain.iter().map(|b| b ^ 0x5a));
        Ok(out)
    }

    fn unprotect(&self, protected: &[u8]) -> Result<Vec<u8>, FortibitError> {
        self.revealed.fetch_add(1, Ordering::SeqCst);
        let body = protected
            .strip_prefix(MARKER)
            .ok_or_else(|| FortibitError::SecureStorage("not protected by memory storage".into()))?;
        Ok(body.iter().map(|b| b ^ 0x5a).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_counts() {
        let storage = MemoryStorage::new();
        let protected = storage.protect(b"secret").unwrap();
        assert!(protected.starts_with(MARKER));
        assert_eq!(storage.unprotect(&protected).unwrap(), b"secret");
        assert_eq!(storage.protect_calls(), 1);
        assert_eq!(storage.unprotect_calls(), 1);
        assert!(storage.unprotect(b"secret").is_err());
    }
}

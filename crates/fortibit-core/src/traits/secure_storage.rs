// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform secure-storage capability.

use crate::error::FortibitError;

/// Obfuscates small secrets (session keys, window passwords) while they sit
/// in host memory.
///
/// One implementation is selected at startup. `unprotect(protect(x)) == x`
/// must hold for every implementation.
pub trait SecureStorage: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether this provider actually transforms the bytes. The identity
    /// provider returns `false`.
    fn is_available(&self) -> bool;

    /// Protect `plain`, returning opaque bytes.
    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>, FortibitError>;

    /// Reverse [`SecureStorage::protect`].
    fn unprotect(&self, protected: &[u8]) -> Result<Vec<u8>, FortibitError>;
}

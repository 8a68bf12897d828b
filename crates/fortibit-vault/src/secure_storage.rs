// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secure-storage providers used to obfuscate session keys and passwords
//! held by the host process.
//!
//! The provider is chosen once at startup by [`secure_storage_for_platform`].

use std::sync::Arc;

use fortibit_core::{FortibitError, SecureStorage};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};

/// Identity provider.
///
/// Bytes are kept as-is, so a host memory dump exposes them directly. Used
/// only when no other provider can be constructed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStorage;

impl SecureStorage for PlainStorage {
    fn name(&self) -> &str {
        "plain"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>, FortibitError> {
        Ok(plain.to_vec())
    }

    fn unprotect(&self, protected: &[u8]) -> Result<Vec<u8>, FortibitError> {
        Ok(protected.to_vec())
    }
}

/// AES-256-GCM under a random key that lives only in this process.
pub struct ProcessSealedStorage {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl std::fmt::Debug for ProcessSealedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSealedStorage")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ProcessSealedStorage {
    pub fn new() -> Result<Self, FortibitError> {
        Ok(Self {
            key: crypto::generate_random_key()?,
        })
    }

    #[cfg(feature = "os-keyring")]
    fn with_key(key: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self { key }
    }
}

impl SecureStorage for ProcessSealedStorage {
    fn name(&self) -> &str {
        "process-sealed"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn protect(&self, plain: &[u8]) -> Result<Vec<u8>, FortibitError> {
        crypto::seal(&self.key, plain)
    }

    fn unprotect(&self, protected: &[u8]) -> Result<Vec<u8>, FortibitError> {
        let mut plain = crypto::open(&self.key, protected)
            .map_err(|e| FortibitError::SecureStorage(format!("cannot reveal bytes: {e}")))?;
        Ok(std::mem::take(&mut *plain))
    }
}

#[cfg(feature = "os-keyring")]
pub use keyring_storage::KeyringStorage;

#[cfg(feature = "os-keyring")]
mod keyring_storage {
    use fortibit_core::{FortibitError, SecureStorage};
    use zeroize::Zeroizing;

    use super::ProcessSealedStorage;
    use crate::crypto::{self, KEY_LEN};

    const SERVICE_NAME: &str = "fortibit";
    const ACCOUNT: &str = "session-wrapping-key";

    /// Wrapping key stored in the OS credential store (Keychain, Credential
    /// Manager, Secret Service), created on first use.
    #[derive(Debug)]
    pub struct KeyringStorage {
        inner: ProcessSealedStorage,
    }

    impl KeyringStorage {
        pub fn new() -> Result<Self, FortibitError> {
            let entry = keyring::Entry::new(SERVICE_NAME, ACCOUNT)
                .map_err(|e| FortibitError::SecureStorage(format!("keyring unavailable: {e}")))?;

            let key = match entry.get_password() {
                Ok(stored) => decode_key(&stored)?,
                Err(keyring::Error::NoEntry) => {
                    let key = crypto::generate_random_key()?;
                    let encoded = Zeroizing::new(hex::encode(key.as_ref()));
                    entry.set_password(&encoded).map_err(|e| {
                        FortibitError::SecureStorage(format!("cannot store wrapping key: {e}"))
                    })?;
                    key
                }
                Err(e) => {
                    return Err(FortibitError::SecureStorage(format!(
                        "keyring unavailable: {e}"
                    )));
                }
            };

            Ok(Self {
                inner: ProcessSealedStorage::with_key(key),
            })
        }
    }

    fn decode_key(stored: &str) -> Result<Zeroizing<[u8; KEY_LEN]>, FortibitError> {
        let bytes = Zeroizing::new(
            hex::decode(stored.trim())
                .map_err(|_| FortibitError::SecureStorage("stored key is not hex".to_string()))?,
        );
        if bytes.len() != KEY_LEN {
            return Err(FortibitError::SecureStorage(
                "stored key has the wrong length".to_string(),
            ));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&bytes);
        Ok(key)
    }

    impl SecureStorage for KeyringStorage {
        fn name(&self) -> &str {
            "os-keyring"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn protect(&self, plain: &[u8]) -> Result<Vec<u8>, FortibitError> {
            self.inner.protect(plain)
        }

        fn unprotect(&self, protected: &[u8]) -> Result<Vec<u8>, FortibitError> {
            self.inner.unprotect(protected)
        }
    }
}

/// Pick the strongest provider available on this platform.
///
/// Order: OS keyring (with the `os-keyring` feature), per-process sealing,
/// then plain bytes.
pub fn secure_storage_for_platform() -> Arc<dyn SecureStorage> {
    #[cfg(feature = "os-keyring")]
    {
        match KeyringStorage::new() {
            Ok(storage) => {
                debug!(provider = storage.name(), "secure storage selected");
                return Arc::new(storage);
            }
            Err(e) => warn!(error = %e, "OS keyring unavailable, falling back"),
        }
    }

    match ProcessSealedStorage::new() {
        Ok(storage) => {
            debug!(provider = storage.name(), "secure storage selected");
            Arc::new(storage)
        }
        Err(e) => {
            warn!(error = %e, "no secure storage available, secrets are held as plain bytes");
            Arc::new(PlainStorage)
        }
    }
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-window session keys and the in-memory secret cipher.
//!
//! A [`SessionKey`] is generated when a vault window opens and protects entry
//! passwords while they sit in host memory. It is unrelated to the
//! master-password-derived key and never touches disk.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fortibit_core::{FortibitError, SecureStorage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{self, KEY_LEN};

/// A random 32-byte key scoped to one vault window.
#[derive(Clone)]
pub struct SessionKey(Zeroizing<[u8; KEY_LEN]>);

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionKey").field(&"[REDACTED]").finish()
    }
}

impl SessionKey {
    /// Rebuild a key from raw bytes. Fails unless exactly 32 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FortibitError> {
        if bytes.len() != KEY_LEN {
            return Err(FortibitError::Decryption(format!(
                "session key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// A cipher for single secrets under this key.
    pub fn cipher(&self) -> SessionCipher<'_> {
        SessionCipher { key: self }
    }
}

impl Serialize for SessionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = Zeroizing::new(STANDARD.encode(self.0.as_ref()));
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for SessionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = Zeroizing::new(String::deserialize(deserializer)?);
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.as_bytes())
                .map_err(serde::de::Error::custom)?,
        );
        SessionKey::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Generate a fresh session key from the system CSPRNG.
pub fn create_session_key() -> Result<SessionKey, FortibitError> {
    Ok(SessionKey(crypto::generate_random_key()?))
}

/// AES-256-GCM over single secrets, keyed by a [`SessionKey`].
///
/// Output is `base64(nonce || ciphertext || tag)`. There is no key derivation
/// step, so this is cheap enough to run per entry.
#[derive(Debug, Clone, Copy)]
pub struct SessionCipher<'k> {
    key: &'k SessionKey,
}

impl SessionCipher<'_> {
    pub fn encrypt(&self, plaintext: &str) -> Result<String, FortibitError> {
        let blob = crypto::seal(self.key.as_bytes(), plaintext.as_bytes())?;
        Ok(STANDARD.encode(blob))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Zeroizing<String>, FortibitError> {
        let blob = STANDARD
            .decode(encoded.trim())
            .map_err(|e| FortibitError::Decryption(format!("malformed base64: {e}")))?;
        let mut plain = crypto::open(self.key.as_bytes(), &blob)?;
        let text = String::from_utf8(std::mem::take(&mut *plain))
            .map_err(|_| FortibitError::Decryption("secret is not valid UTF-8".to_string()))?;
        Ok(Zeroizing::new(text))
    }
}

/// A session key as held by the host between requests: protected by the
/// platform [`SecureStorage`] provider.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ObfuscatedKey(Vec<u8>);

impl fmt::Debug for ObfuscatedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObfuscatedKey").field(&"[REDACTED]").finish()
    }
}

impl ObfuscatedKey {
    pub fn obfuscate(key: &SessionKey, storage: &dyn SecureStorage) -> Result<Self, FortibitError> {
        Ok(Self(storage.protect(key.as_bytes())?))
    }

    /// The bytes as held between requests.
    pub fn protected_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn reveal(&self, storage: &dyn SecureStorage) -> Result<SessionKey, FortibitError> {
        let bytes = Zeroizing::new(storage.unprotect(&self.0)?);
        SessionKey::from_bytes(&bytes)
    }
}

/// A master password as held by the host between requests.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ObfuscatedSecret(Vec<u8>);

impl fmt::Debug for ObfuscatedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObfuscatedSecret").field(&"[REDACTED]").finish()
    }
}

impl ObfuscatedSecret {
    pub fn obfuscate(secret: &str, storage: &dyn SecureStorage) -> Result<Self, FortibitError> {
        Ok(Self(storage.protect(secret.as_bytes())?))
    }

    pub fn protected_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn reveal(&self, storage: &dyn SecureStorage) -> Result<Zeroizing<String>, FortibitError> {
        let bytes = storage.unprotect(&self.0)?;
        let text = String::from_utf8(bytes)
            .map_err(|_| FortibitError::SecureStorage("stored secret is not UTF-8".to_string()))?;
        Ok(Zeroizing::new(text))
    }
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations and the password-based
//! string envelope.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG, and every password envelope a fresh 256-bit salt. Nonce reuse would
//! be catastrophic for GCM security.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fortibit_core::FortibitError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf;

/// AES-256-GCM key length.
pub const KEY_LEN: usize = 32;
/// GCM nonce length.
pub const NONCE_LEN: usize = 12;
/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;
/// Password envelope salt length.
pub const SALT_LEN: usize = 32;
/// Shortest decodable password envelope: salt, nonce and tag around an empty plaintext.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, FortibitError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| FortibitError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, FortibitError> {
    let less_safe = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| FortibitError::Internal("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
    in_out.extend_from_slice(&nonce_bytes);
    in_out.extend_from_slice(plaintext);

    // Seal the tail in place; the nonce prefix stays as-is.
    let tag = less_safe
        .seal_in_place_separate_tag(nonce, Aad::empty(), &mut in_out[NONCE_LEN..])
        .map_err(|_| FortibitError::Internal("AES-256-GCM encryption failed".to_string()))?;
    in_out.extend_from_slice(tag.as_ref());

    Ok(in_out)
}

/// Decrypt a `nonce || ciphertext || tag` blob produced by [`seal`].
///
/// Fails with [`FortibitError::Decryption`] when the blob is too short to
/// hold a nonce and tag, and with [`FortibitError::Authentication`] when the
/// tag does not verify. No plaintext is returned on failure.
pub fn open(key: &[u8; KEY_LEN], blob: &[u8]) -> Result<Zeroizing<Vec<u8>>, FortibitError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(FortibitError::Decryption(format!(
            "ciphertext too short: {} bytes",
            blob.len()
        )));
    }
    let less_safe = aead_key(key)?;

    let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| FortibitError::Decryption("invalid nonce".to_string()))?;

    let mut in_out = Zeroizing::new(sealed.to_vec());
    let plain_len = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| FortibitError::Authentication)?
        .len();
    in_out.truncate(plain_len);

    Ok(in_out)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<Zeroizing<[u8; KEY_LEN]>, FortibitError> {
    let rng = SystemRandom::new();
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rng.fill(key.as_mut())
        .map_err(|_| FortibitError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}

/// Encrypt `plaintext` under a key derived from `password` with a fresh salt.
///
/// Returns `base64(salt || nonce || ciphertext || tag)`.
pub fn encrypt_with_password(plaintext: &[u8], password: &str) -> Result<String, FortibitError> {
    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password.as_bytes(), &salt)?;
    let sealed = seal(&key, plaintext)?;

    let mut envelope = Vec::with_capacity(SALT_LEN + sealed.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&sealed);
    Ok(STANDARD.encode(envelope))
}

/// Reverse of [`encrypt_with_password`].
///
/// Malformed base64 and truncated envelopes are rejected before any key
/// derivation work is done.
pub fn decrypt_with_password(
    encoded: &str,
    password: &str,
) -> Result<Zeroizing<Vec<u8>>, FortibitError> {
    let envelope = STANDARD
        .decode(encoded.trim())
        .map_err(|e| FortibitError::Decryption(format!("malformed base64: {e}")))?;
    if envelope.len() < MIN_ENVELOPE_LEN {
        return Err(FortibitError::Decryption(format!(
            "envelope too short: {} bytes",
            envelope.len()
        )));
    }

    let (salt_bytes, sealed) = envelope.split_at(SALT_LEN);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(salt_bytes);

    let key = kdf::derive_key(password.as_bytes(), &salt)?;
    open(&key, sealed)
}

/// String convenience wrapper around [`encrypt_with_password`].
pub fn encrypt_string(plaintext: &str, password: &str) -> Result<String, FortibitError> {
    encrypt_with_password(plaintext.as_bytes(), password)
}

/// String convenience wrapper around [`decrypt_with_password`].
pub fn decrypt_string(encoded: &str, password: &str) -> Result<Zeroizing<String>, FortibitError> {
    let mut bytes = decrypt_with_password(encoded, password)?;
    let text = String::from_utf8(std::mem::take(&mut *bytes))
        .map_err(|_| FortibitError::Decryption("plaintext is not valid UTF-8".to_string()))?;
    Ok(Zeroizing::new(text))
}

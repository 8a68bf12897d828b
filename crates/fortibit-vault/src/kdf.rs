// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! scrypt key derivation from a master password.
//!
//! Cost parameters are fixed at compile time so an attacker-controlled file
//! can never request a cheaper derivation.

use fortibit_core::FortibitError;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::crypto::{KEY_LEN, SALT_LEN};

/// scrypt CPU/memory cost, as log2(N).
pub const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size.
pub const SCRYPT_R: u32 = 8;
/// scrypt parallelism.
pub const SCRYPT_P: u32 = 1;

/// Derive a 32-byte key from `password` and `salt` using scrypt.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
) -> Result<Zeroizing<[u8; KEY_LEN]>, FortibitError> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| FortibitError::Internal(format!("invalid scrypt parameters: {e}")))?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password, salt, &params, output.as_mut())
        .map_err(|e| FortibitError::Internal(format!("scrypt key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random 32-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN], FortibitError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| FortibitError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}

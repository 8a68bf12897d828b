// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic core of the Fortibit vault.
//!
//! - [`crypto`]: AES-256-GCM seal/open and the password envelope
//!   `base64(salt || nonce || ciphertext || tag)`.
//! - [`kdf`]: scrypt key derivation with fixed cost parameters.
//! - [`session`]: per-window session keys protecting secrets in host memory.
//! - [`secure_storage`]: providers that obfuscate session keys and passwords.
//! - [`codec`]: the versioned vault payload and its envelope.

pub mod codec;
pub mod crypto;
pub mod kdf;
pub mod prompt;
pub mod secure_storage;
pub mod session;

pub use codec::{CURRENT_SCHEMA_VERSION, VaultPayload, VaultTable};
pub use crypto::{decrypt_string, encrypt_string};
pub use prompt::get_vault_passphrase;
pub use secure_storage::{PlainStorage, ProcessSealedStorage, secure_storage_for_platform};
pub use session::{ObfuscatedKey, ObfuscatedSecret, SessionCipher, SessionKey, create_session_key};

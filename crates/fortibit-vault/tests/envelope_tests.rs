// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the vault envelope.
//!
//! Each case runs scrypt, so case counts are kept small.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fortibit_core::FortibitError;
use fortibit_vault::codec::{self, ENTRIES_TABLE, VaultPayload};
use proptest::prelude::*;
use serde_json::json;

fn payload_with(passwords: &[String]) -> VaultPayload {
    let mut payload = VaultPayload::empty();
    if let Some(entries) = payload.table_mut(ENTRIES_TABLE) {
        for (i, pw) in passwords.iter().enumerate() {
            entries
                .rows
                .push(json!({"id": i, "type": "password", "title": format!("entry {i}"), "password": pw}));
        }
    }
    payload
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn wrap_unwrap_roundtrip(
        passwords in proptest::collection::vec("[ -~]{0,24}", 0..4),
        master in "[a-zA-Z0-9]{1,16}",
    ) {
        let payload = payload_with(&passwords);
        let envelope = codec::wrap(&payload, &master).unwrap();
        prop_assert_eq!(codec::unwrap(&envelope, &master).unwrap(), payload);
    }

    #[test]
    fn flipped_envelope_byte_is_rejected(index in any::<prop::sample::Index>(), bit in 0u8..8) {
        let envelope = codec::wrap(&payload_with(&["pw".to_string()]), "master").unwrap();
        let mut raw = STANDARD.decode(&envelope).unwrap();
        let i = index.index(raw.len());
        raw[i] ^= 1 << bit;
        let tampered = STANDARD.encode(raw);

        prop_assert!(matches!(
            codec::unwrap(&tampered, "master"),
            Err(FortibitError::Authentication)
        ));
    }
}

#[test]
fn wrong_password_never_returns_plaintext() {
    let envelope = codec::wrap(&payload_with(&["secret".to_string()]), "first").unwrap();
    assert!(matches!(
        codec::unwrap(&envelope, "second"),
        Err(FortibitError::Authentication)
    ));
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault payload builders.

use fortibit_vault::codec::{ENTRIES_TABLE, GROUPS_TABLE};
use fortibit_vault::{SessionKey, VaultPayload};
use serde_json::{Value, json};

/// A password entry row with a plaintext secret.
pub fn password_row(id: i64, title: &str, username: &str, password: &str) -> Value {
    json!({
        "id": id,
        "type": "password",
        "title": title,
        "username": username,
        "password": password,
        "groupId": 1,
    })
}

/// A payload with one group and the given plaintext password entries.
pub fn payload_with_plain(entries: &[(i64, &str, &str)]) -> VaultPayload {
    let mut payload = VaultPayload::empty();
    if let Some(groups) = payload.table_mut(GROUPS_TABLE) {
        groups.rows.push(json!({"id": 1, "name": "Database", "isImported": false}));
    }
    if let Some(rows) = payload.table_mut(ENTRIES_TABLE) {
        for (id, title, password) in entries {
            rows.rows.push(password_row(*id, title, "user@example.com", password));
        }
    }
    payload
}

/// Same as [`payload_with_plain`], with each secret protected by `key`, the
/// form the host holds while a vault is unlocked.
pub fn payload_with_protected(key: &SessionKey, entries: &[(i64, &str, &str)]) -> VaultPayload {
    let cipher = key.cipher();
    let protected: Vec<(i64, &str, String)> = entries
        .iter()
        .map(|(id, title, password)| {
            let encrypted = cipher
                .encrypt(password)
                .unwrap_or_else(|e| panic!("session encryption failed: {e}"));
            (*id, *title, encrypted)
        })
        .collect();

    let mut payload = VaultPayload::empty();
    if let Some(groups) = payload.table_mut(GROUPS_TABLE) {
        groups.rows.push(json!({"id": 1, "name": "Database", "isImported": false}));
    }
    if let Some(rows) = payload.table_mut(ENTRIES_TABLE) {
        for (id, title, password) in &protected {
            rows.rows.push(password_row(*id, title, "user@example.com", password));
        }
    }
    payload
}

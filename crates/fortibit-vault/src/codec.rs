// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logical vault payload and the on-disk envelope codec.
//!
//! On disk a vault is `base64(salt || nonce || ciphertext || tag)` where the
//! ciphertext decrypts to the JSON form of [`VaultPayload`]:
//!
//! ```json
//! { "schemaVersion": 1, "data": { "tables": [ { "tableName": "entries", "rows": [] } ] } }
//! ```

use fortibit_core::{EntryId, FortibitError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::Zeroizing;

use crate::crypto;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
/// Oldest schema version this build can read.
pub const MIN_SCHEMA_VERSION: u32 = 1;

pub const ENTRIES_TABLE: &str = "entries";
pub const GROUPS_TABLE: &str = "groups";

const PASSWORD_FIELD: &str = "password";
const PASSWORD_ENTRY_TYPE: &str = "password";

/// A plaintext vault snapshot: entries, groups, schema version and any extra
/// top-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultPayload {
    pub schema_version: u32,
    pub data: VaultData,
    /// Unrecognized top-level fields, preserved across a round-trip.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultData {
    #[serde(default)]
    pub tables: Vec<VaultTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTable {
    pub table_name: String,
    #[serde(default)]
    pub rows: Vec<Value>,
}

impl VaultTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table_name: name.into(),
            rows: Vec::new(),
        }
    }
}

impl VaultPayload {
    /// A new vault with empty `entries` and `groups` tables.
    pub fn empty() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            data: VaultData {
                tables: vec![VaultTable::new(ENTRIES_TABLE), VaultTable::new(GROUPS_TABLE)],
            },
            metadata: Map::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&VaultTable> {
        self.data.tables.iter().find(|t| t.table_name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut VaultTable> {
        self.data.tables.iter_mut().find(|t| t.table_name == name)
    }

    /// Rows of the `entries` table, or an empty slice when it is absent.
    pub fn entries(&self) -> &[Value] {
        self.table(ENTRIES_TABLE)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn groups(&self) -> &[Value] {
        self.table(GROUPS_TABLE)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    /// Apply `f` to the `password` of every password-bearing entry row.
    ///
    /// Returns the number of passwords rewritten. Stops at the first error;
    /// callers discard the payload in that case.
    pub fn map_entry_passwords<F>(&mut self, mut f: F) -> Result<usize, FortibitError>
    where
        F: FnMut(&str) -> Result<String, FortibitError>,
    {
        let Some(table) = self.table_mut(ENTRIES_TABLE) else {
            return Ok(0);
        };
        let mut count = 0;
        for row in &mut table.rows {
            count += usize::from(map_row_password(row, &mut f)?);
        }
        Ok(count)
    }
}

/// Whether `row` is an entry whose `password` field is a secret.
///
/// Rows with no `type` are treated as password entries.
pub fn is_password_entry(row: &Value) -> bool {
    match row.get("type") {
        None | Some(Value::Null) => true,
        Some(Value::String(t)) => t == PASSWORD_ENTRY_TYPE,
        Some(_) => false,
    }
}

/// The secret of a password entry row, if it has one.
pub fn entry_password(row: &Value) -> Option<&str> {
    if !is_password_entry(row) {
        return None;
    }
    row.get(PASSWORD_FIELD).and_then(Value::as_str)
}

/// The `id` of an entry row.
pub fn entry_id(row: &Value) -> Option<EntryId> {
    row.get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
}

/// Rewrite the `password` of one row with `f`. Returns whether a value was rewritten.
pub fn map_row_password<F>(row: &mut Value, f: &mut F) -> Result<bool, FortibitError>
where
    F: FnMut(&str) -> Result<String, FortibitError>,
{
    if !is_password_entry(row) {
        return Ok(false);
    }
    let Some(Value::String(current)) = row.get_mut(PASSWORD_FIELD) else {
        return Ok(false);
    };
    if current.is_empty() {
        return Ok(false);
    }
    let replaced = f(current)?;
    let old = std::mem::replace(current, replaced);
    drop(Zeroizing::new(old));
    Ok(true)
}

/// Serialize a payload to JSON bytes.
pub fn serialize(payload: &VaultPayload) -> Result<Zeroizing<Vec<u8>>, FortibitError> {
    serde_json::to_vec(payload)
        .map(Zeroizing::new)
        .map_err(|e| FortibitError::Schema(format!("cannot serialize payload: {e}")))
}

/// Parse JSON bytes into a payload, checking the schema version first.
pub fn deserialize(bytes: &[u8]) -> Result<VaultPayload, FortibitError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| FortibitError::Schema(format!("payload is not valid JSON: {e}")))?;

    let version = match value.get("schemaVersion") {
        None | Some(Value::Null) => {
            return Err(FortibitError::Schema("missing schemaVersion".to_string()));
        }
        Some(v) => v
            .as_u64()
            .ok_or_else(|| FortibitError::Schema(format!("invalid schemaVersion {v}")))?,
    };
    if !(u64::from(MIN_SCHEMA_VERSION)..=u64::from(CURRENT_SCHEMA_VERSION)).contains(&version) {
        return Err(FortibitError::Schema(format!(
            "unsupported schemaVersion {version} (supported {MIN_SCHEMA_VERSION}..={CURRENT_SCHEMA_VERSION})"
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| FortibitError::Schema(format!("malformed payload: {e}")))
}

/// Serialize `payload` and encrypt it under `password`.
///
/// The envelope always carries [`CURRENT_SCHEMA_VERSION`].
pub fn wrap(payload: &VaultPayload, password: &str) -> Result<String, FortibitError> {
    let bytes = if payload.schema_version == CURRENT_SCHEMA_VERSION {
        serialize(payload)?
    } else {
        let mut stamped = payload.clone();
        stamped.schema_version = CURRENT_SCHEMA_VERSION;
        serialize(&stamped)?
    };
    crypto::encrypt_with_password(&bytes, password)
}

/// Decrypt an envelope with `password` and parse the payload.
///
/// A wrong password, a flipped byte, a truncated file and malformed base64 all
/// fail with [`FortibitError::Authentication`].
pub fn unwrap(envelope: &str, password: &str) -> Result<VaultPayload, FortibitError> {
    let bytes = crypto::decrypt_with_password(envelope, password).map_err(|e| match e {
        FortibitError::Decryption(_) => FortibitError::Authentication,
        other => other,
    })?;
    deserialize(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> VaultPayload {
        let mut payload = VaultPayload::empty();
        if let Some(entries) = payload.table_mut(ENTRIES_TABLE) {
            entries.rows.push(json!({"id": 1, "type": "password", "title": "mail", "password": "s3cret"}));
            entries.rows.push(json!({"id": 2, "title": "legacy", "password": "old"}));
            entries.rows.push(json!({"id": 3, "type": "note", "password": "not a secret field"}));
        }
        payload
    }

    #[test]
    fn concrete_wrap_unwrap_scenario() {
        let payload: VaultPayload = serde_json::from_value(json!({
            "schemaVersion": 1,
            "data": {"tables": [{"tableName": "entries", "rows": []}]}
        }))
        .unwrap();

        let envelope = wrap(&payload, "correct-password").unwrap();
        assert_eq!(unwrap(&envelope, "correct-password").unwrap(), payload);
        assert!(matches!(
            unwrap(&envelope, "wrong-password"),
            Err(FortibitError::Authentication)
        ));
    }

    #[test]
    fn wrap_twice_differs() {
        let payload = sample_payload();
        assert_ne!(wrap(&payload, "pw").unwrap(), wrap(&payload, "pw").unwrap());
    }

    #[test]
    fn truncated_envelope_is_authentication_error() {
        let envelope = wrap(&VaultPayload::empty(), "pw").unwrap();
        let truncated = &envelope[..16];
        assert!(matches!(unwrap(truncated, "pw"), Err(FortibitError::Authentication)));
    }

    #[test]
    fn deserialize_requires_schema_version() {
        let err = deserialize(br#"{"data":{"tables":[]}}"#).unwrap_err();
        assert!(matches!(err, FortibitError::Schema(m) if m.contains("missing")));
    }

    #[test]
    fn deserialize_rejects_future_version() {
        let err = deserialize(br#"{"schemaVersion":99,"data":{"tables":[]}}"#).unwrap_err();
        assert!(matches!(err, FortibitError::Schema(m) if m.contains("unsupported")));
    }

    #[test]
    fn metadata_survives_roundtrip() {
        let bytes = br#"{"schemaVersion":1,"data":{"tables":[]},"createdBy":"import"}"#;
        let payload = deserialize(bytes).unwrap();
        assert_eq!(payload.metadata.get("createdBy"), Some(&json!("import")));
        let again = deserialize(&serialize(&payload).unwrap()).unwrap();
        assert_eq!(again, payload);
    }

    #[test]
    fn accessors_find_tables() {
        let payload = sample_payload();
        assert_eq!(payload.entries().len(), 3);
        assert!(payload.groups().is_empty());
        assert!(payload.table("missing").is_none());
    }

    #[test]
    fn only_password_entries_are_mapped() {
        let mut payload = sample_payload();
        let count = payload
            .map_entry_passwords(|p| Ok(p.to_uppercase()))
            .unwrap();

        assert_eq!(count, 2);
        let entries = payload.entries();
        assert_eq!(entry_password(&entries[0]), Some("S3CRET"));
        assert_eq!(entry_password(&entries[1]), Some("OLD"));
        assert_eq!(entries[2]["password"], json!("not a secret field"));
    }

    #[test]
    fn entry_id_accepts_numbers_and_strings() {
        assert_eq!(entry_id(&json!({"id": 7})), Some(EntryId::from(7)));
        assert_eq!(entry_id(&json!({"id": "abc"})), Some(EntryId::from("abc")));
        assert_eq!(entry_id(&json!({"title": "x"})), None);
    }
}

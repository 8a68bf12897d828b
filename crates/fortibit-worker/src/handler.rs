// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request execution inside a worker.
//!
//! Master-password-derived keys and revealed entry secrets exist only inside
//! these functions and are zeroized when they return.

use fortibit_breach::{BreachQueryUnit, RangeClient, RangeSettings};
use fortibit_core::FortibitError;
use fortibit_vault::codec::{self, VaultPayload};
use fortibit_vault::SessionKey;
use serde_json::Value;
use tracing::debug;

use crate::protocol::{SecretText, StrengthReport, WorkerRequest, WorkerResponse};
use crate::strength;

/// Execute one request. Errors are folded into [`WorkerResponse::Error`].
pub async fn handle(request: WorkerRequest) -> WorkerResponse {
    let kind = request.kind();
    let result = match request {
        WorkerRequest::GetLeaks {
            payload,
            session_key,
            range,
        } => get_leaks(payload, &session_key, &range).await,
        other => match tokio::task::spawn_blocking(move || handle_blocking(other)).await {
            Ok(result) => result,
            Err(e) => Err(FortibitError::Internal(format!("worker task failed: {e}"))),
        },
    };

    match result {
        Ok(response) => {
            debug!(request = kind, response = response.kind(), "worker request handled");
            response
        }
        Err(e) => {
            debug!(request = kind, error = %e, "worker request failed");
            WorkerResponse::from_error(&e)
        }
    }
}

/// CPU-bound requests. `GetLeaks` needs the network and is rejected here.
pub fn handle_blocking(request: WorkerRequest) -> Result<WorkerResponse, FortibitError> {
    match request {
        WorkerRequest::EncryptDatabase {
            mut payload,
            password,
            session_key,
        } => {
            let cipher = session_key.cipher();
            payload.map_entry_passwords(|protected| Ok(cipher.decrypt(protected)?.to_string()))?;
            let encrypted = codec::wrap(&payload, password.expose())?;
            Ok(WorkerResponse::Encrypted { encrypted })
        }
        WorkerRequest::DecryptDatabase {
            envelope,
            password,
            session_key,
        } => {
            let mut payload = codec::unwrap(&envelope, password.expose())?;
            let cipher = session_key.cipher();
            let count = payload.map_entry_passwords(|plain| cipher.encrypt(plain))?;
            debug!(entry_count = count, "entry secrets re-protected");
            Ok(WorkerResponse::Decrypted { payload })
        }
        WorkerRequest::EncryptString { plain, session_key } => Ok(WorkerResponse::Encrypted {
            encrypted: session_key.cipher().encrypt(plain.expose())?,
        }),
        WorkerRequest::DecryptString {
            encrypted,
            session_key,
        } => Ok(WorkerResponse::DecryptedString {
            plain: SecretText::from(session_key.cipher().decrypt(&encrypted)?),
        }),
        WorkerRequest::BulkEncryptString {
            mut items,
            session_key,
        } => {
            let cipher = session_key.cipher();
            map_rows(&mut items, |plain| cipher.encrypt(plain))?;
            Ok(WorkerResponse::BulkEncrypted { items })
        }
        WorkerRequest::BulkDecryptString {
            mut items,
            session_key,
        } => {
            let cipher = session_key.cipher();
            map_rows(&mut items, |protected| {
                Ok(cipher.decrypt(protected)?.to_string())
            })?;
            Ok(WorkerResponse::BulkDecrypted { items })
        }
        WorkerRequest::GetWeakPasswords {
            payload,
            session_key,
        } => Ok(WorkerResponse::WeakPasswords {
            reports: weak_passwords(&payload, &session_key)?,
        }),
        WorkerRequest::GetLeaks { .. } => Err(FortibitError::Internal(
            "GetLeaks cannot run on the blocking path".to_string(),
        )),
    }
}

fn map_rows<F>(rows: &mut [Value], mut f: F) -> Result<(), FortibitError>
where
    F: FnMut(&str) -> Result<String, FortibitError>,
{
    for row in rows {
        codec::map_row_password(row, &mut f)?;
    }
    Ok(())
}

fn weak_passwords(
    payload: &VaultPayload,
    session_key: &SessionKey,
) -> Result<Vec<StrengthReport>, FortibitError> {
    let cipher = session_key.cipher();
    let mut reports = Vec::new();
    for row in payload.entries() {
        let (Some(id), Some(protected)) = (codec::entry_id(row), codec::entry_password(row)) else {
            continue;
        };
        if protected.is_empty() {
            continue;
        }
        let plain = cipher.decrypt(protected)?;
        reports.push(StrengthReport {
            id,
            score: strength::score(&plain),
        });
    }
    Ok(reports)
}

async fn get_leaks(
    payload: VaultPayload,
    session_key: &SessionKey,
    range: &RangeSettings,
) -> Result<WorkerResponse, FortibitError> {
    let cipher = session_key.cipher();
    let mut units = Vec::new();
    for row in payload.entries() {
        let (Some(id), Some(protected)) = (codec::entry_id(row), codec::entry_password(row)) else {
            continue;
        };
        if protected.is_empty() {
            continue;
        }
        let plain = cipher.decrypt(protected)?;
        units.push(BreachQueryUnit::from_secret(id, &plain));
    }
    drop(payload);

    let client = RangeClient::new(range)?;
    let reports = client.check_all(units).await;
    Ok(WorkerResponse::Leaks { reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortibit_core::EntryId;
    use fortibit_vault::codec::ENTRIES_TABLE;
    use fortibit_vault::create_session_key;
    use serde_json::json;

    fn protected_payload(key: &SessionKey) -> VaultPayload {
        let cipher = key.cipher();
        let mut payload = VaultPayload::empty();
        if let Some(entries) = payload.table_mut(ENTRIES_TABLE) {
            entries.rows.push(json!({"id": 1, "type": "password", "password": cipher.encrypt("password").unwrap()}));
            entries.rows.push(json!({"id": 2, "type": "password", "password": cipher.encrypt("v7#Lq!z9Tm@2Wx$e").unwrap()}));
            entries.rows.push(json!({"id": 3, "type": "note", "password": "n/a"}));
        }
        payload
    }

    #[test]
    fn database_roundtrip_through_handler() {
        let key = create_session_key().unwrap();
        let payload = protected_payload(&key);

        let encrypted = match handle_blocking(WorkerRequest::EncryptDatabase {
            payload: payload.clone(),
            password: SecretText::new("master"),
            session_key: key.clone(),
        })
        .unwrap()
        {
            WorkerResponse::Encrypted { encrypted } => encrypted,
            other => panic!("unexpected {other:?}"),
        };

        // On disk, entry secrets are plaintext inside the envelope.
        let on_disk = codec::unwrap(&encrypted, "master").unwrap();
        assert_eq!(codec::entry_password(&on_disk.entries()[0]), Some("password"));

        let decrypted = match handle_blocking(WorkerRequest::DecryptDatabase {
            envelope: encrypted,
            password: SecretText::new("master"),
            session_key: key.clone(),
        })
        .unwrap()
        {
            WorkerResponse::Decrypted { payload } => payload,
            other => panic!("unexpected {other:?}"),
        };

        // Back in the host, secrets are session-protected again.
        let first = codec::entry_password(&decrypted.entries()[0]).unwrap();
        assert_ne!(first, "password");
        assert_eq!(key.cipher().decrypt(first).unwrap().as_str(), "password");
        assert_eq!(decrypted.entries()[2]["password"], json!("n/a"));
    }

    #[test]
    fn wrong_master_password_is_authentication_error() {
        let key = create_session_key().unwrap();
        let envelope = codec::wrap(&VaultPayload::empty(), "right").unwrap();
        let result = handle_blocking(WorkerRequest::DecryptDatabase {
            envelope,
            password: SecretText::new("wrong"),
            session_key: key,
        });
        assert!(matches!(result, Err(FortibitError::Authentication)));
    }

    #[test]
    fn bulk_decrypt_reveals_password_fields() {
        let key = create_session_key().unwrap();
        let items = vec![json!({"id": 5, "password": key.cipher().encrypt("export-me").unwrap()})];
        let response = handle_blocking(WorkerRequest::BulkDecryptString {
            items,
            session_key: key,
        })
        .unwrap();
        match response {
            WorkerResponse::BulkDecrypted { items } => {
                assert_eq!(items[0]["password"], json!("export-me"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn weak_password_scores_per_entry() {
        let key = create_session_key().unwrap();
        let reports = weak_passwords(&protected_payload(&key), &key).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, EntryId::from(1));
        assert!(reports[0].is_weak());
        assert!(!reports[1].is_weak());
    }

    #[tokio::test]
    async fn handler_folds_errors_into_response() {
        let key = create_session_key().unwrap();
        let response = handle(WorkerRequest::DecryptString {
            encrypted: "%%%".to_string(),
            session_key: key,
        })
        .await;
        assert!(matches!(response, WorkerResponse::Error { .. }));
    }
}

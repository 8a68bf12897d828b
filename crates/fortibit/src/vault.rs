// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault commands: `create`, `open`, `add`, `change-password`, `recent`.
//!
//! Each command runs in a single file-manager window. Passwords come from
//! the environment or a TTY prompt and are never printed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fortibit_config::FortibitConfig;
use fortibit_core::{FortibitError, SaveOptions, SaveOutcome, WindowId};
use fortibit_files::FileManager;
use fortibit_vault::codec::{self, ENTRIES_TABLE, GROUPS_TABLE};
use fortibit_vault::prompt::{
    NEW_VAULT_KEY_ENV_VAR, VAULT_KEY_ENV_VAR, get_vault_passphrase,
    get_vault_passphrase_with_confirm,
};
use fortibit_vault::{VaultPayload, VaultTable, secure_storage_for_platform};
use fortibit_worker::WorkerClient;
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::dialog::ArgumentDialog;

/// Environment variable holding the secret for `add`.
pub const ENTRY_SECRET_ENV_VAR: &str = "FORTIBIT_ENTRY_SECRET";

/// A file manager with one registered window.
pub struct VaultSession {
    pub manager: Arc<FileManager>,
    pub dialog: Arc<ArgumentDialog>,
    pub window: WindowId,
}

impl VaultSession {
    pub async fn start(config: &FortibitConfig) -> Result<Self, FortibitError> {
        let dialog = Arc::new(ArgumentDialog::new());
        let worker = WorkerClient::from_config(&config.worker)?;
        let manager = FileManager::new(config, worker, dialog.clone(), secure_storage_for_platform()).await?;
        let window = manager.register_window().await?;
        Ok(Self {
            manager: Arc::new(manager),
            dialog,
            window,
        })
    }

    /// Select `path` and decrypt it with the master password.
    pub async fn unlock(&self, path: &Path) -> Result<VaultPayload, FortibitError> {
        self.manager
            .open_database(self.window, Some(path.to_path_buf()))
            .await?;
        let passphrase = get_vault_passphrase()?;
        self.manager
            .decrypt_database(self.window, passphrase.expose_secret())
            .await
    }

    /// Save to the window's current file with its current password.
    pub async fn save(&self, payload: VaultPayload) -> Result<PathBuf, FortibitError> {
        let outcome = self
            .manager
            .save_database(self.window, payload, None, SaveOptions::default())
            .await?;
        saved_path(outcome)
    }

    pub async fn finish(self) {
        self.manager.on_app_exit().await;
    }
}

fn saved_path(outcome: SaveOutcome) -> Result<PathBuf, FortibitError> {
    match outcome {
        SaveOutcome::Saved { file, .. } => Ok(file),
        SaveOutcome::Cancelled => Err(FortibitError::Internal("save was cancelled".to_string())),
        SaveOutcome::Failed(message) => Err(FortibitError::Internal(message)),
    }
}

/// `fortibit create <path>`
pub async fn run_create(config: &FortibitConfig, path: &Path) -> Result<(), FortibitError> {
    let target = fortibit_files::atomic::with_vault_extension(path);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return Err(FortibitError::Config(format!(
            "{} already exists",
            target.display()
        )));
    }

    let passphrase = get_vault_passphrase_with_confirm(VAULT_KEY_ENV_VAR)?;
    let session = VaultSession::start(config).await?;

    let mut payload = VaultPayload::empty();
    if let Some(groups) = payload.table_mut(GROUPS_TABLE) {
        groups.rows.push(json!({"id": 1, "name": "Database", "isImported": false}));
    }

    session.dialog.queue(path)?;
    let options = SaveOptions {
        force_new: true,
        notify: true,
    };
    let outcome = session
        .manager
        .save_database(session.window, payload, Some(passphrase.expose_secret()), options)
        .await?;
    let file = saved_path(outcome)?;
    session.finish().await;

    println!("created {}", file.display());
    Ok(())
}

/// `fortibit open <path>`: list entries, optionally reveal one or restore
/// the recovery snapshot.
pub async fn run_open(
    config: &FortibitConfig,
    path: &Path,
    reveal: Option<i64>,
    recover: bool,
) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    let mut payload = session.unlock(path).await?;

    match session.manager.check_recovery_file(session.window).await? {
        Some(snapshot) if recover => {
            payload = session.manager.recover_file(session.window).await?;
            let file = session.save(payload.clone()).await?;
            info!(snapshot = %snapshot.display(), "recovery snapshot restored");
            println!("restored unsaved changes into {}", file.display());
        }
        Some(snapshot) => {
            warn!(snapshot = %snapshot.display(), "recovery snapshot present");
            eprintln!("unsaved changes from an earlier session exist; rerun with --recover to restore them");
        }
        None if recover => eprintln!("no recovery snapshot for this vault"),
        None => {}
    }

    print_entries(&payload);

    if let Some(id) = reveal {
        let row = payload
            .entries()
            .iter()
            .find(|row| row.get("id").and_then(Value::as_i64) == Some(id))
            .ok_or_else(|| FortibitError::Config(format!("no entry with id {id}")))?;
        let protected = codec::entry_password(row)
            .ok_or_else(|| FortibitError::Config(format!("entry {id} has no password")))?;
        let plain = session
            .manager
            .decrypt_password(session.window, protected)
            .await?;
        println!("{}", plain.as_str());
    }

    session.finish().await;
    Ok(())
}

fn print_entries(payload: &VaultPayload) {
    let text = |row: &Value, field: &str| {
        row.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    println!("{} entries", payload.entries().len());
    for row in payload.entries() {
        let id = row.get("id").and_then(Value::as_i64).unwrap_or_default();
        println!("{id:>4}  {}  {}", text(row, "title"), text(row, "username"));
    }
}

/// `fortibit add <path> --title <title>`
pub async fn run_add(
    config: &FortibitConfig,
    path: &Path,
    title: &str,
    username: &str,
) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    let mut payload = session.unlock(path).await?;

    let secret = read_entry_secret()?;
    let protected = session
        .manager
        .encrypt_password(session.window, &secret)
        .await?;
    drop(secret);

    let id = payload
        .entries()
        .iter()
        .filter_map(|row| row.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1;
    let group = payload
        .groups()
        .first()
        .and_then(|g| g.get("id"))
        .cloned()
        .unwrap_or(Value::Null);

    if payload.table(ENTRIES_TABLE).is_none() {
        payload.data.tables.push(VaultTable::new(ENTRIES_TABLE));
    }
    if let Some(entries) = payload.table_mut(ENTRIES_TABLE) {
        entries.rows.push(json!({
            "id": id,
            "type": "password",
            "title": title,
            "username": username,
            "password": protected,
            "groupId": group,
        }));
    }

    let file = session.save(payload).await?;
    session.finish().await;

    println!("added entry {id} to {}", file.display());
    Ok(())
}

fn read_entry_secret() -> Result<Zeroizing<String>, FortibitError> {
    match std::env::var(ENTRY_SECRET_ENV_VAR) {
        Ok(secret) if !secret.is_empty() => return Ok(Zeroizing::new(secret)),
        _ => {}
    }
    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Entry password: ");
        let secret = rpassword::read_password()
            .map_err(|e| FortibitError::Internal(format!("failed to read password: {e}")))?;
        return Ok(Zeroizing::new(secret));
    }
    Err(FortibitError::Config(format!(
        "no entry password provided. Set {ENTRY_SECRET_ENV_VAR} or run interactively."
    )))
}

/// `fortibit change-password <path>`
pub async fn run_change_password(config: &FortibitConfig, path: &Path) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    let payload = session.unlock(path).await?;

    let next = get_vault_passphrase_with_confirm(NEW_VAULT_KEY_ENV_VAR)?;
    let outcome = session
        .manager
        .save_database(
            session.window,
            payload,
            Some(next.expose_secret()),
            SaveOptions::default(),
        )
        .await?;
    let file = saved_path(outcome)?;
    session.finish().await;

    println!("master password changed for {}", file.display());
    Ok(())
}

/// `fortibit recent`
pub async fn run_recent(config: &FortibitConfig) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    for path in session.manager.recent_files().await {
        println!("{}", path.display());
    }
    Ok(())
}

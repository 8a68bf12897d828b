// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The vault file manager.
//!
//! Owns the window table (`WindowId -> WindowEntry`) and drives each window
//! through `NoFile -> FileSelected -> Unlocked <-> Locked`, with the window
//! closed by removing its entry. All cryptography goes through the
//! [`WorkerClient`]; the manager only ever holds the window password and
//! session key in obfuscated form.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use fortibit_breach::{BreachReport, RangeSettings};
use fortibit_config::model::FortibitConfig;
use fortibit_core::{
    DialogOutcome, FileDialogProvider, FileFilter, FortibitError, SaveOptions, SaveOutcome,
    SecureStorage, WindowId, WindowState,
};
use fortibit_vault::{SessionKey, VaultPayload};
use fortibit_worker::{StrengthReport, WorkerClient};
use serde_json::Value;
use tokio::sync::{Mutex, broadcast};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::atomic;
use crate::recent::RecentFiles;
use crate::recovery::RecoveryStore;
use crate::report::{self, ReportKind, ReportRow};
use crate::window::{LockEvent, LockReason, WindowEntry};

/// Behavioural switches taken from the configuration.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Lock a window after this much inactivity. `None` disables the idle lock.
    pub idle_timeout: Option<Duration>,
    pub lock_on_system_lock: bool,
    pub save_on_lock: bool,
    pub breach_enabled: bool,
    pub range: RangeSettings,
}

impl From<&FortibitConfig> for ManagerSettings {
    fn from(config: &FortibitConfig) -> Self {
        Self {
            idle_timeout: (config.lock.idle_seconds > 0)
                .then(|| Duration::from_secs(config.lock.idle_seconds)),
            lock_on_system_lock: config.lock.lock_on_system_lock,
            save_on_lock: config.lock.save_on_lock,
            breach_enabled: config.breach.enabled,
            range: RangeSettings::from(&config.breach),
        }
    }
}

pub struct FileManager {
    windows: Mutex<HashMap<WindowId, WindowEntry>>,
    next_window: AtomicU32,
    worker: WorkerClient,
    dialogs: Arc<dyn FileDialogProvider>,
    storage: Arc<dyn SecureStorage>,
    recovery: RecoveryStore,
    recent: Mutex<RecentFiles>,
    settings: ManagerSettings,
    lock_events: broadcast::Sender<LockEvent>,
}

impl std::fmt::Debug for FileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileManager")
            .field("worker", &self.worker)
            .field("storage", &self.storage.name())
            .field("recovery", &self.recovery)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FileManager {
    pub async fn new(
        config: &FortibitConfig,
        worker: WorkerClient,
        dialogs: Arc<dyn FileDialogProvider>,
        storage: Arc<dyn SecureStorage>,
    ) -> Result<Self, FortibitError> {
        let data_dir = PathBuf::from(&config.app.data_dir);
        let recovery = RecoveryStore::open(&data_dir).await?;
        let recent = RecentFiles::load(&data_dir, config.app.max_recent_files).await;
        let (lock_events, _) = broadcast::channel(64);

        debug!(
            data_dir = %data_dir.display(),
            storage = storage.name(),
            protected = storage.is_available(),
            "file manager ready"
        );

        Ok(Self {
            windows: Mutex::new(HashMap::new()),
            next_window: AtomicU32::new(1),
            worker,
            dialogs,
            storage,
            recovery,
            recent: Mutex::new(recent),
            settings: ManagerSettings::from(config),
            lock_events,
        })
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// Receive every lock transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LockEvent> {
        self.lock_events.subscribe()
    }

    // --- window lifecycle ---

    /// Create an empty window with its own session key.
    pub async fn register_window(&self) -> Result<WindowId, FortibitError> {
        let id = WindowId(self.next_window.fetch_add(1, Ordering::SeqCst));
        let entry = WindowEntry::new(&*self.storage)?;
        self.windows.lock().await.insert(id, entry);
        debug!(window_id = %id, "window registered");
        Ok(id)
    }

    /// Forget the window, its password and its session key.
    pub async fn close_window(&self, window: WindowId) -> Result<(), FortibitError> {
        let entry = self
            .windows
            .lock()
            .await
            .remove(&window)
            .ok_or(FortibitError::UnknownWindow(window))?;

        if let Some(file) = &entry.file {
            if let Err(e) = self.recovery.remove(file).await {
                warn!(window_id = %window, error = %e, "could not remove recovery snapshot");
            }
        }
        debug!(window_id = %window, "window closed");
        Ok(())
    }

    pub async fn state(&self, window: WindowId) -> Result<WindowState, FortibitError> {
        self.with_window(window, |entry| Ok(entry.state())).await
    }

    pub async fn window_ids(&self) -> Vec<WindowId> {
        let mut ids: Vec<_> = self.windows.lock().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// The vault path of the window, if one was selected.
    pub async fn check_open_mode(&self, window: WindowId) -> Result<Option<PathBuf>, FortibitError> {
        self.with_window(window, |entry| Ok(entry.file().cloned())).await
    }

    // --- file selection ---

    /// Select a vault for `window`. With no `path` the open dialog is shown.
    ///
    /// Nothing is decrypted here. An explicit path that no longer exists is
    /// dropped from the recently-opened list and reported as an I/O error.
    pub async fn open_database(
        &self,
        window: WindowId,
        path: Option<PathBuf>,
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        self.with_window(window, |_| Ok(())).await?;

        let path = match path {
            Some(path) => {
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    if let Err(e) = self.recent.lock().await.remove(&path).await {
                        warn!(error = %e, "could not update recently opened list");
                    }
                    return Err(FortibitError::io(
                        &path,
                        io::Error::new(io::ErrorKind::NotFound, "vault file does not exist"),
                    ));
                }
                path
            }
            None => match self
                .dialogs
                .show_open_dialog(window, &[FileFilter::vault()])
                .await?
            {
                DialogOutcome::Cancelled => return Ok(DialogOutcome::Cancelled),
                DialogOutcome::Selected(path) => path,
            },
        };

        self.select_file(window, path.clone()).await?;
        Ok(DialogOutcome::Selected(path))
    }

    /// Select a vault dropped onto the window.
    pub async fn drop_file(&self, window: WindowId, path: PathBuf) -> Result<PathBuf, FortibitError> {
        self.select_file(window, path.clone()).await?;
        Ok(path)
    }

    /// Detach the window from its vault so a new one can be created.
    pub async fn create_new(&self, window: WindowId) -> Result<(), FortibitError> {
        let storage = &*self.storage;
        self.with_window(window, |entry| entry.reset(storage)).await
    }

    async fn select_file(&self, window: WindowId, path: PathBuf) -> Result<(), FortibitError> {
        {
            let mut windows = self.windows.lock().await;
            ensure_not_open_elsewhere(&windows, window, &path)?;
            let entry = windows
                .get_mut(&window)
                .ok_or(FortibitError::UnknownWindow(window))?;
            entry.select_file(path.clone());
            entry.touch();
        }
        if let Err(e) = self.recent.lock().await.record(&path).await {
            warn!(error = %e, "could not update recently opened list");
        }
        info!(window_id = %window, path = %path.display(), "vault selected");
        Ok(())
    }

    pub async fn recent_files(&self) -> Vec<PathBuf> {
        self.recent.lock().await.list()
    }

    // --- unlock / save ---

    /// Decrypt the selected vault with `password`.
    ///
    /// On success the window becomes `Unlocked` and remembers the password in
    /// obfuscated form. On failure the window state is unchanged.
    pub async fn decrypt_database(
        &self,
        window: WindowId,
        password: &str,
    ) -> Result<VaultPayload, FortibitError> {
        let storage = &*self.storage;
        let (file, key) = self
            .with_window(window, |entry| {
                let file = entry.file().cloned().ok_or_else(|| FortibitError::InvalidState {
                    window,
                    message: "no vault file selected".to_string(),
                })?;
                entry.touch();
                Ok((file, entry.session_key(storage)?))
            })
            .await?;

        let envelope = atomic::read_envelope(&file).await?;
        let payload = match self.worker.decrypt_database(envelope, password, &key).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(window_id = %window, error = %e, "vault unlock failed");
                return Err(e);
            }
        };
        drop(key);

        self.with_window(window, |entry| {
            if entry.file() != Some(&file) {
                return Err(FortibitError::InvalidState {
                    window,
                    message: "vault file changed during unlock".to_string(),
                });
            }
            entry.set_password(password, storage)?;
            entry.state = WindowState::Unlocked;
            entry.touch();
            Ok(())
        })
        .await?;

        info!(
            window_id = %window,
            entry_count = payload.entries().len(),
            "vault unlocked"
        );
        Ok(payload)
    }

    /// Encrypt `payload` and write it to the window's vault.
    ///
    /// The save dialog is shown when `options.force_new` is set or when the
    /// window has no known password or file. `password` replaces the known
    /// password when given. I/O failures come back as
    /// [`SaveOutcome::Failed`] with the previous file left intact.
    pub async fn save_database(
        &self,
        window: WindowId,
        payload: VaultPayload,
        password: Option<&str>,
        options: SaveOptions,
    ) -> Result<SaveOutcome, FortibitError> {
        let storage = &*self.storage;
        let (current_file, known_password, key) = self
            .with_window(window, |entry| {
                entry.touch();
                Ok((
                    entry.file().cloned(),
                    entry.password(storage)?,
                    entry.session_key(storage)?,
                ))
            })
            .await?;

        let needs_dialog = options.force_new || known_password.is_none() || current_file.is_none();
        let Some(effective) = password
            .map(|p| Zeroizing::new(p.to_string()))
            .or(known_password)
        else {
            return Err(FortibitError::InvalidState {
                window,
                message: "no password to encrypt the vault with".to_string(),
            });
        };

        let target = match (needs_dialog, &current_file) {
            (false, Some(file)) => atomic::with_vault_extension(file),
            _ => match self
                .dialogs
                .show_save_dialog(window, &[FileFilter::vault()])
                .await?
            {
                DialogOutcome::Cancelled => {
                    debug!(window_id = %window, "save cancelled");
                    return Ok(SaveOutcome::Cancelled);
                }
                DialogOutcome::Selected(path) => atomic::with_vault_extension(&path),
            },
        };

        ensure_not_open_elsewhere(&*self.windows.lock().await, window, &target)?;

        let envelope = self.worker.encrypt_database(payload, &effective, &key).await?;
        drop(key);

        let write_target = target.clone();
        let written = tokio::task::spawn_blocking(move || {
            atomic::write_atomic(&write_target, envelope.as_bytes())
        })
        .await
        .map_err(|e| FortibitError::Internal(format!("save task failed: {e}")))?;
        if let Err(e) = written {
            warn!(window_id = %window, path = %target.display(), error = %e, "vault save failed");
            return Ok(SaveOutcome::Failed(e.user_message()));
        }

        let previous = self
            .with_window(window, |entry| {
                let previous = entry.file.replace(target.clone());
                entry.set_password(&effective, storage)?;
                entry.state = WindowState::Unlocked;
                entry.touch();
                Ok(previous)
            })
            .await?;

        if previous.as_ref() != Some(&target) {
            if let Err(e) = self.recent.lock().await.record(&target).await {
                warn!(error = %e, "could not update recently opened list");
            }
        }
        for file in previous.iter().chain(std::iter::once(&target)) {
            if let Err(e) = self.recovery.remove(file).await {
                warn!(window_id = %window, error = %e, "could not remove recovery snapshot");
            }
        }

        info!(window_id = %window, path = %target.display(), "vault saved");
        Ok(SaveOutcome::Saved {
            file: target,
            notify: options.notify,
        })
    }

    /// Whether `candidate` equals the window's current password.
    pub async fn validate_password(
        &self,
        window: WindowId,
        candidate: &str,
    ) -> Result<bool, FortibitError> {
        if candidate.is_empty() {
            return Ok(false);
        }
        let storage = &*self.storage;
        let known = self.with_window(window, |entry| entry.password(storage)).await?;
        Ok(known.is_some_and(|known| constant_time_eq(known.as_bytes(), candidate.as_bytes())))
    }

    // --- entry secrets ---

    pub async fn encrypt_password(&self, window: WindowId, plain: &str) -> Result<String, FortibitError> {
        let key = self.session_key(window).await?;
        self.worker.encrypt_string(plain, &key).await
    }

    pub async fn decrypt_password(
        &self,
        window: WindowId,
        encrypted: &str,
    ) -> Result<Zeroizing<String>, FortibitError> {
        let key = self.session_key(window).await?;
        self.worker.decrypt_string(encrypted, &key).await
    }

    /// Reveal the `password` field of each row, for export.
    pub async fn bulk_decrypt(&self, window: WindowId, items: Vec<Value>) -> Result<Vec<Value>, FortibitError> {
        let key = self.session_key(window).await?;
        let count = items.len();
        let items = self.worker.bulk_decrypt(items, &key).await?;
        debug!(window_id = %window, entry_count = count, "entries revealed for export");
        Ok(items)
    }

    /// Protect the `password` field of each row, for import.
    pub async fn bulk_encrypt(&self, window: WindowId, items: Vec<Value>) -> Result<Vec<Value>, FortibitError> {
        let key = self.session_key(window).await?;
        self.worker.bulk_encrypt(items, &key).await
    }

    pub async fn scan_leaks(
        &self,
        window: WindowId,
        payload: VaultPayload,
    ) -> Result<Vec<BreachReport>, FortibitError> {
        if !self.settings.breach_enabled {
            return Err(FortibitError::Config(
                "breach checks are disabled ([breach] enabled = false)".to_string(),
            ));
        }
        let key = self.session_key(window).await?;
        let reports = self
            .worker
            .get_leaks(payload, &key, self.settings.range.clone())
            .await?;
        info!(
            window_id = %window,
            checked = reports.len(),
            exposed = reports.iter().filter(|r| r.is_exposed()).count(),
            "breach scan finished"
        );
        Ok(reports)
    }

    pub async fn get_weak_passwords(
        &self,
        window: WindowId,
        payload: VaultPayload,
    ) -> Result<Vec<StrengthReport>, FortibitError> {
        let key = self.session_key(window).await?;
        self.worker.get_weak_passwords(payload, &key).await
    }

    /// Ask for a destination and write a CSV report there.
    pub async fn save_report(
        &self,
        window: WindowId,
        kind: ReportKind,
        rows: Vec<ReportRow>,
    ) -> Result<DialogOutcome<PathBuf>, FortibitError> {
        let path = match self
            .dialogs
            .show_save_dialog(window, &[FileFilter::csv()])
            .await?
        {
            DialogOutcome::Cancelled => return Ok(DialogOutcome::Cancelled),
            DialogOutcome::Selected(path) if path.extension().is_none() => path.with_extension("csv"),
            DialogOutcome::Selected(path) => path,
        };

        let target = path.clone();
        tokio::task::spawn_blocking(move || report::write_report(&target, kind, &rows))
            .await
            .map_err(|e| FortibitError::Internal(format!("report task failed: {e}")))??;
        info!(window_id = %window, path = %path.display(), report = kind.file_stem(), "report saved");
        Ok(DialogOutcome::Selected(path))
    }

    // --- recovery snapshots ---

    /// Encrypt the working set with the window password into its recovery file.
    pub async fn save_snapshot(
        &self,
        window: WindowId,
        payload: VaultPayload,
    ) -> Result<PathBuf, FortibitError> {
        let (file, password, key) = self.unlocked_context(window).await?;
        let envelope = self.worker.encrypt_database(payload, &password, &key).await?;
        self.recovery.write(&file, &envelope).await
    }

    /// The recovery file left for this window's vault, if any.
    pub async fn check_recovery_file(&self, window: WindowId) -> Result<Option<PathBuf>, FortibitError> {
        match self.check_open_mode(window).await? {
            Some(file) => Ok(self.recovery.find(&file).await),
            None => Ok(None),
        }
    }

    /// Decrypt the recovery file with the window password.
    pub async fn recover_file(&self, window: WindowId) -> Result<VaultPayload, FortibitError> {
        let (file, password, key) = self.unlocked_context(window).await?;
        let envelope = self.recovery.read(&file).await?;
        self.worker.decrypt_database(envelope, &password, &key).await
    }

    pub async fn remove_recovery_file(&self, window: WindowId) -> Result<(), FortibitError> {
        match self.check_open_mode(window).await? {
            Some(file) => self.recovery.remove(&file).await,
            None => Ok(()),
        }
    }

    pub async fn clear_recovery_files(&self) -> Result<usize, FortibitError> {
        let removed = self.recovery.clear().await?;
        debug!(removed, "recovery snapshots cleared");
        Ok(removed)
    }

    // --- locking ---

    /// Lock an unlocked window. With `save_on_lock`, `pending` is saved first.
    pub async fn lock(&self, window: WindowId, pending: Option<VaultPayload>) -> Result<(), FortibitError> {
        self.lock_window(window, pending, LockReason::Explicit).await?;
        Ok(())
    }

    /// Lock every unlocked window; called when the OS screen locks.
    pub async fn lock_all(&self) -> Result<Vec<WindowId>, FortibitError> {
        if !self.settings.lock_on_system_lock {
            return Ok(Vec::new());
        }
        let unlocked = self.unlocked_windows(|_| true).await;
        self.lock_each(unlocked, LockReason::SystemLock).await
    }

    /// Record user activity in `window`.
    pub async fn touch(&self, window: WindowId) -> Result<(), FortibitError> {
        self.with_window(window, |entry| {
            entry.touch();
            Ok(())
        })
        .await
    }

    /// Lock windows idle for at least the configured timeout.
    pub async fn lock_idle_windows(&self) -> Result<Vec<WindowId>, FortibitError> {
        let Some(timeout) = self.settings.idle_timeout else {
            return Ok(Vec::new());
        };
        let now = Instant::now();
        let idle = self
            .unlocked_windows(|entry| now.duration_since(entry.last_activity) >= timeout)
            .await;
        self.lock_each(idle, LockReason::Idle).await
    }

    /// Forget every window password. The windows keep their files.
    pub async fn on_app_exit(&self) {
        let mut windows = self.windows.lock().await;
        for entry in windows.values_mut() {
            entry.password = None;
            if entry.state == WindowState::Unlocked {
                entry.state = WindowState::Locked;
            }
        }
        debug!(windows = windows.len(), "window passwords cleared");
    }

    async fn lock_each(
        &self,
        windows: Vec<WindowId>,
        reason: LockReason,
    ) -> Result<Vec<WindowId>, FortibitError> {
        let mut locked = Vec::with_capacity(windows.len());
        for window in windows {
            match self.lock_window(window, None, reason).await {
                Ok(true) => locked.push(window),
                Ok(false) | Err(FortibitError::UnknownWindow(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(locked)
    }

    async fn lock_window(
        &self,
        window: WindowId,
        pending: Option<VaultPayload>,
        reason: LockReason,
    ) -> Result<bool, FortibitError> {
        let (state, file) = self
            .with_window(window, |entry| Ok((entry.state(), entry.file().cloned())))
            .await?;
        if state != WindowState::Unlocked {
            return Ok(false);
        }

        if self.settings.save_on_lock {
            if let Some(payload) = pending {
                let options = SaveOptions {
                    force_new: false,
                    notify: false,
                };
                match self.save_database(window, payload, None, options).await {
                    Ok(SaveOutcome::Saved { .. }) => {}
                    Ok(outcome) => warn!(window_id = %window, ?outcome, "save before lock did not complete"),
                    Err(e) => warn!(window_id = %window, error = %e, "save before lock failed"),
                }
            }
        }

        let storage = &*self.storage;
        self.with_window(window, |entry| entry.lock(storage)).await?;
        if let Some(file) = file {
            if let Err(e) = self.recovery.remove(&file).await {
                warn!(window_id = %window, error = %e, "could not remove recovery snapshot");
            }
        }

        // No subscribers is fine.
        let _ = self.lock_events.send(LockEvent { window, reason });
        info!(window_id = %window, ?reason, "vault locked");
        Ok(true)
    }

    async fn unlocked_windows(&self, filter: impl Fn(&WindowEntry) -> bool) -> Vec<WindowId> {
        let windows = self.windows.lock().await;
        let mut ids: Vec<_> = windows
            .iter()
            .filter(|(_, entry)| entry.state() == WindowState::Unlocked && filter(entry))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    // --- helpers ---

    async fn with_window<T>(
        &self,
        window: WindowId,
        f: impl FnOnce(&mut WindowEntry) -> Result<T, FortibitError>,
    ) -> Result<T, FortibitError> {
        let mut windows = self.windows.lock().await;
        let entry = windows
            .get_mut(&window)
            .ok_or(FortibitError::UnknownWindow(window))?;
        f(entry)
    }

    async fn session_key(&self, window: WindowId) -> Result<SessionKey, FortibitError> {
        let storage = &*self.storage;
        self.with_window(window, |entry| {
            entry.touch();
            entry.session_key(storage)
        })
        .await
    }

    async fn unlocked_context(
        &self,
        window: WindowId,
    ) -> Result<(PathBuf, Zeroizing<String>, SessionKey), FortibitError> {
        let storage = &*self.storage;
        self.with_window(window, |entry| {
            let (Some(file), Some(password)) = (entry.file().cloned(), entry.password(storage)?) else {
                return Err(FortibitError::InvalidState {
                    window,
                    message: "vault is not unlocked".to_string(),
                });
            };
            Ok((file, password, entry.session_key(storage)?))
        })
        .await
    }
}

/// Advisory lock: a vault path belongs to at most one live window.
fn ensure_not_open_elsewhere(
    windows: &HashMap<WindowId, WindowEntry>,
    window: WindowId,
    path: &Path,
) -> Result<(), FortibitError> {
    let wanted = comparable(path);
    for (id, entry) in windows {
        if *id == window {
            continue;
        }
        if entry.file().is_some_and(|other| comparable(other) == wanted) {
            return Err(FortibitError::PathAlreadyOpen {
                path: path.to_path_buf(),
                window: *id,
            });
        }
    }
    Ok(())
}

fn comparable(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_config() {
        let mut config = FortibitConfig::default();
        config.lock.idle_seconds = 0;
        assert!(ManagerSettings::from(&config).idle_timeout.is_none());

        config.lock.idle_seconds = 90;
        let settings = ManagerSettings::from(&config);
        assert_eq!(settings.idle_timeout, Some(Duration::from_secs(90)));
        assert_eq!(settings.range.api_url, config.breach.api_url);
    }

    #[test]
    fn constant_time_eq_compares_content_and_length() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|part| part == needle)
    }

    #[tokio::test]
    async fn unlocked_window_retains_neither_password_nor_derived_key() {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;
        use fortibit_vault::crypto::SALT_LEN;
        use fortibit_vault::{ProcessSealedStorage, codec, kdf};
        use fortibit_worker::ThreadSpawner;

        const PASSWORD: &str = "correct horse battery staple";

        let harness = fortibit_test_utils::TestHarness::builder().build().unwrap();
        let storage: Arc<dyn SecureStorage> = Arc::new(ProcessSealedStorage::new().unwrap());
        let worker = WorkerClient::new(Arc::new(ThreadSpawner), Duration::from_secs(60), 2);
        let manager = FileManager::new(&harness.config, worker, harness.dialog.clone(), storage.clone())
            .await
            .unwrap();

        let file = harness.vault_path("isolated.fbit");
        let envelope = codec::wrap(&VaultPayload::empty(), PASSWORD).unwrap();
        std::fs::write(&file, &envelope).unwrap();

        let window = manager.register_window().await.unwrap();
        manager.drop_file(window, file).await.unwrap();
        manager.decrypt_database(window, PASSWORD).await.unwrap();

        // The key the worker derived for this file.
        let raw = STANDARD.decode(envelope.trim()).unwrap();
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&raw[..SALT_LEN]);
        let derived = kdf::derive_key(PASSWORD.as_bytes(), &salt).unwrap();

        {
            let windows = manager.windows.lock().await;
            let entry = &windows[&window];
            let password = entry.password.as_ref().unwrap();
            for retained in [password.protected_bytes(), entry.key.protected_bytes()] {
                assert!(!contains(retained, PASSWORD.as_bytes()));
                assert!(!contains(retained, derived.as_slice()));
            }
            assert_eq!(entry.password(&*storage).unwrap().unwrap().as_str(), PASSWORD);
            assert!(!format!("{windows:?}").contains(PASSWORD));
        }
        assert!(!format!("{manager:?}").contains(PASSWORD));
    }
}

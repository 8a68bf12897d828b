// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-recovery snapshots.
//!
//! While a vault is unlocked the UI periodically hands over the working set,
//! which is encrypted with the window password and written to
//! `<data_dir>/tmp/~<hash>.tmp`, where `<hash>` is derived from the vault
//! path. A snapshot is removed on lock, on window close and after every
//! successful save, so one that survives means the app did not shut down
//! cleanly.

use std::io;
use std::path::{Path, PathBuf};

use fortibit_core::FortibitError;
use tracing::{debug, warn};

/// 31-bit string hash rendered as lowercase hex.
///
/// Iterates UTF-16 code units with `h = h * 31 + c` in wrapping 32-bit
/// arithmetic, then masks off the sign bit. Matches the snapshot names
/// written by earlier desktop releases.
pub fn path_hash(value: &str) -> String {
    if value.is_empty() {
        return "0".to_string();
    }
    let hash = value
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c)));
    format!("{:x}", hash & 0x7fff_ffff)
}

/// Directory of recovery snapshots.
#[derive(Debug, Clone)]
pub struct RecoveryStore {
    dir: PathBuf,
}

impl RecoveryStore {
    /// Use `<data_dir>/tmp`, creating it when missing.
    pub async fn open(data_dir: &Path) -> Result<Self, FortibitError> {
        let dir = data_dir.join("tmp");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| FortibitError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot path for the vault at `vault_path`.
    pub fn path_for(&self, vault_path: &Path) -> PathBuf {
        let hash = path_hash(&vault_path.to_string_lossy());
        self.dir.join(format!("~{hash}.tmp"))
    }

    /// The snapshot path for `vault_path`, if one exists.
    pub async fn find(&self, vault_path: &Path) -> Option<PathBuf> {
        let path = self.path_for(vault_path);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    pub async fn write(&self, vault_path: &Path, envelope: &str) -> Result<PathBuf, FortibitError> {
        let path = self.path_for(vault_path);
        tokio::fs::write(&path, envelope.as_bytes())
            .await
            .map_err(|e| FortibitError::io(&path, e))?;
        debug!(snapshot = %path.display(), "recovery snapshot written");
        Ok(path)
    }

    pub async fn read(&self, vault_path: &Path) -> Result<String, FortibitError> {
        let path = self.path_for(vault_path);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| FortibitError::io(&path, e))?;
        Ok(text.trim().to_string())
    }

    /// Remove the snapshot for `vault_path`. Missing snapshots are fine.
    pub async fn remove(&self, vault_path: &Path) -> Result<(), FortibitError> {
        let path = self.path_for(vault_path);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(snapshot = %path.display(), "recovery snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FortibitError::io(&path, e)),
        }
    }

    /// Delete every snapshot. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, FortibitError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(FortibitError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FortibitError::io(&self.dir, e))?
        {
            let path = entry.path();
            let result = if path.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove recovery file"),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_known_values() {
        assert_eq!(path_hash(""), "0");
        // "a" -> 97
        assert_eq!(path_hash("a"), "61");
        // "hello" -> 99162322
        assert_eq!(path_hash("hello"), "5e918d2");
        // Overflowing input keeps 31 bits.
        let long = path_hash("/home/user/Documents/passwords.fbit");
        assert!(u32::from_str_radix(&long, 16).unwrap() <= 0x7fff_ffff);
    }

    #[tokio::test]
    async fn write_find_remove_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecoveryStore::open(dir.path()).await.unwrap();
        let vault = Path::new("/vaults/a.fbit");

        assert!(store.find(vault).await.is_none());
        let written = store.write(vault, "ENVELOPE").await.unwrap();
        assert_eq!(store.find(vault).await, Some(written.clone()));
        assert!(written.file_name().unwrap().to_string_lossy().starts_with('~'));
        assert_eq!(store.read(vault).await.unwrap(), "ENVELOPE");

        store.remove(vault).await.unwrap();
        store.remove(vault).await.unwrap();
        assert!(store.find(vault).await.is_none());

        store.write(Path::new("/x.fbit"), "1").await.unwrap();
        store.write(Path::new("/y.fbit"), "2").await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
    }
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe vault writes.
//!
//! The encrypted vault is first written to a sibling temp file (`vault.fbit`
//! -> `vault~`), then copied over the target. If the copy fails the temp file
//! is renamed over the target instead. The temp file never survives the call.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fortibit_core::{FortibitError, VAULT_FILE_EXTENSION};
use tracing::{debug, warn};

/// Append `.fbit` unless `path` already ends with it.
pub fn with_vault_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == VAULT_FILE_EXTENSION) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(VAULT_FILE_EXTENSION);
    PathBuf::from(name)
}

/// Temp sibling used while saving `target`: the extension is replaced by `~`.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("vault"));
    let mut name = stem;
    name.push("~");
    target.with_file_name(name)
}

/// The two filesystem steps that move the temp file into place.
///
/// Exists so tests can inject failures between temp-write and promotion.
pub trait Promote: Send + Sync {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Plain `std::fs` promotion.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPromote;

impl Promote for FsPromote {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

/// Write `contents` to `target` through a temp sibling.
pub fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), FortibitError> {
    write_atomic_with(&FsPromote, target, contents)
}

pub fn write_atomic_with(
    promote: &dyn Promote,
    target: &Path,
    contents: &[u8],
) -> Result<(), FortibitError> {
    let temp = temp_path_for(target);

    if let Err(e) = std::fs::write(&temp, contents) {
        remove_quietly(&temp);
        return Err(FortibitError::io(&temp, e));
    }

    let result = match promote.copy(&temp, target) {
        Ok(()) => Ok(()),
        Err(copy_err) => {
            warn!(path = %target.display(), error = %copy_err, "copy over vault failed, renaming instead");
            promote
                .rename(&temp, target)
                .map_err(|e| FortibitError::io(target, e))
        }
    };

    remove_quietly(&temp);
    if result.is_ok() {
        debug!(path = %target.display(), bytes = contents.len(), "vault written");
    }
    result
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove temp file"),
    }
}

/// Read a vault file as base64 envelope text.
///
/// Files holding the raw envelope bytes instead of base64 text are accepted
/// and re-encoded.
pub async fn read_envelope(path: &Path) -> Result<String, FortibitError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FortibitError::io(path, e))?;

    if let Ok(text) = std::str::from_utf8(&bytes) {
        let trimmed = text.trim();
        if !trimmed.is_empty() && STANDARD.decode(trimmed).is_ok() {
            return Ok(trimmed.to_string());
        }
    }
    Ok(STANDARD.encode(&bytes))
}

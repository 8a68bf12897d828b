// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recently opened vaults, persisted to `<data_dir>/workspaces.json`.

use std::io;
use std::path::{Path, PathBuf};

use fortibit_core::FortibitError;
use serde::{Deserialize, Serialize};
use tracing::warn;

const WORKSPACES_FILE: &str = "workspaces.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspaces {
    /// The vault opened most recently.
    #[serde(default)]
    pub workspace: Option<String>,
    /// Most recent first, no duplicates.
    #[serde(default)]
    pub recently_opened: Vec<String>,
}

#[derive(Debug)]
pub struct RecentFiles {
    path: PathBuf,
    max: usize,
    state: Workspaces,
}

impl RecentFiles {
    /// Load the list from `data_dir`. A missing or unreadable file starts empty.
    pub async fn load(data_dir: &Path, max: usize) -> Self {
        let path = data_dir.join(WORKSPACES_FILE);
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed workspaces file");
                Workspaces::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Workspaces::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read workspaces file");
                Workspaces::default()
            }
        };
        let mut recent = Self {
            path,
            max: max.max(1),
            state,
        };
        recent.state.recently_opened.truncate(recent.max);
        recent
    }

    pub fn list(&self) -> Vec<PathBuf> {
        self.state.recently_opened.iter().map(PathBuf::from).collect()
    }

    pub fn workspaces(&self) -> &Workspaces {
        &self.state
    }

    /// Move `vault` to the front and persist.
    pub async fn record(&mut self, vault: &Path) -> Result<(), FortibitError> {
        let entry = vault.to_string_lossy().to_string();
        self.state.recently_opened.retain(|p| *p != entry);
        self.state.recently_opened.insert(0, entry.clone());
        self.state.recently_opened.truncate(self.max);
        self.state.workspace = Some(entry);
        self.persist().await
    }

    /// Drop `vault` from the list and persist.
    pub async fn remove(&mut self, vault: &Path) -> Result<(), FortibitError> {
        let entry = vault.to_string_lossy();
        let before = self.state.recently_opened.len();
        self.state.recently_opened.retain(|p| *p != entry);
        if self.state.recently_opened.len() == before {
            return Ok(());
        }
        self.persist().await
    }

    async fn persist(&self) -> Result<(), FortibitError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FortibitError::io(parent, e))?;
        }
        let json = serde_json::to_vec(&self.state)
            .map_err(|e| FortibitError::Internal(format!("cannot encode workspaces: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| FortibitError::io(&self.path, e))
    }
}

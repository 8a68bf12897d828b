// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background idle-lock task.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::manager::FileManager;

/// How often idle windows are checked: a quarter of the timeout, between one
/// and thirty seconds.
pub fn check_interval(idle_timeout: Duration) -> Duration {
    (idle_timeout / 4).clamp(Duration::from_secs(1), Duration::from_secs(30))
}

/// Periodically lock idle windows until `cancel` fires.
///
/// Returns immediately when the idle lock is disabled.
pub async fn run_idle_monitor(manager: Arc<FileManager>, cancel: CancellationToken) {
    let Some(timeout) = manager.settings().idle_timeout else {
        debug!("idle lock disabled");
        return;
    };

    let mut interval = tokio::time::interval(check_interval(timeout));
    // Skip the first immediate tick.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match manager.lock_idle_windows().await {
                    Ok(locked) if !locked.is_empty() => {
                        info!(count = locked.len(), "idle windows locked");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "idle lock check failed"),
                }
            }
            _ = cancel.cancelled() => {
                debug!("idle monitor shutting down");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_clamped() {
        assert_eq!(check_interval(Duration::from_secs(2)), Duration::from_secs(1));
        assert_eq!(check_interval(Duration::from_secs(60)), Duration::from_secs(15));
        assert_eq!(check_interval(Duration::from_secs(600)), Duration::from_secs(30));
    }
}

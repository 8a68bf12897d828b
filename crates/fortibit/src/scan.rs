// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `check-leaks` and `weak-passwords`.

use std::path::{Path, PathBuf};

use fortibit_breach::BreachOutcome;
use fortibit_config::FortibitConfig;
use fortibit_core::{DialogOutcome, FortibitError};
use fortibit_files::{ReportKind, ReportRow, report};
use tracing::info;

use crate::vault::VaultSession;

pub async fn run_check_leaks(
    config: &FortibitConfig,
    path: &Path,
    report_path: Option<PathBuf>,
) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    let payload = session.unlock(path).await?;

    let reports = session
        .manager
        .scan_leaks(session.window, payload.clone())
        .await?;
    let failed = reports
        .iter()
        .filter(|r| matches!(r.outcome, BreachOutcome::Failed { .. }))
        .count();
    let rows = report::exposed_rows(&payload, &reports);

    for row in &rows {
        println!("{} ({}): seen {} times", row.title, row.username, row.value);
    }
    println!("{} of {} passwords exposed", rows.len(), reports.len());
    if failed > 0 {
        eprintln!("{failed} passwords could not be checked");
    }

    write_report(&session, ReportKind::ExposedPasswords, rows, report_path).await?;
    session.finish().await;
    Ok(())
}

pub async fn run_weak_passwords(
    config: &FortibitConfig,
    path: &Path,
    report_path: Option<PathBuf>,
) -> Result<(), FortibitError> {
    let session = VaultSession::start(config).await?;
    let payload = session.unlock(path).await?;

    let reports = session
        .manager
        .get_weak_passwords(session.window, payload.clone())
        .await?;
    let rows = report::weak_rows(&payload, &reports);

    for row in &rows {
        println!("{} ({}): score {}/4", row.title, row.username, row.value);
    }
    println!("{} of {} passwords are weak", rows.len(), reports.len());

    write_report(&session, ReportKind::WeakPasswords, rows, report_path).await?;
    session.finish().await;
    Ok(())
}

async fn write_report(
    session: &VaultSession,
    kind: ReportKind,
    rows: Vec<ReportRow>,
    target: Option<PathBuf>,
) -> Result<(), FortibitError> {
    let Some(target) = target else {
        return Ok(());
    };
    session.dialog.queue(target)?;
    if let DialogOutcome::Selected(written) = session
        .manager
        .save_report(session.window, kind, rows)
        .await?
    {
        info!(path = %written.display(), "report written");
        println!("report written to {}", written.display());
    }
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV reports of exposed and weak passwords.
//!
//! Reports name entries by title and username only. Secrets never appear.

use std::collections::HashMap;
use std::path::Path;

use fortibit_breach::{BreachOutcome, BreachReport};
use fortibit_core::{EntryId, FortibitError};
use fortibit_vault::VaultPayload;
use fortibit_vault::codec;
use fortibit_worker::StrengthReport;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub title: String,
    pub username: String,
    pub value: u64,
}

/// Which report is being written; decides the third column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    ExposedPasswords,
    WeakPasswords,
}

impl ReportKind {
    fn value_column(self) -> &'static str {
        match self {
            ReportKind::ExposedPasswords => "occurrences",
            ReportKind::WeakPasswords => "score",
        }
    }

    /// Default file stem, e.g. `exposed_passwords_report`.
    pub fn file_stem(self) -> &'static str {
        match self {
            ReportKind::ExposedPasswords => "exposed_passwords_report",
            ReportKind::WeakPasswords => "weak_passwords_report",
        }
    }
}

fn entry_labels(payload: &VaultPayload) -> HashMap<EntryId, (String, String)> {
    let text = |row: &Value, field: &str| {
        row.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    payload
        .entries()
        .iter()
        .filter_map(|row| {
            codec::entry_id(row).map(|id| (id, (text(row, "title"), text(row, "username"))))
        })
        .collect()
}

/// Rows for entries found in the breach corpus.
pub fn exposed_rows(payload: &VaultPayload, reports: &[BreachReport]) -> Vec<ReportRow> {
    let labels = entry_labels(payload);
    reports
        .iter()
        .filter_map(|report| match report.outcome {
            BreachOutcome::Occurrences { count } if count > 0 => {
                let (title, username) = labels.get(&report.id).cloned().unwrap_or_default();
                Some(ReportRow {
                    title,
                    username,
                    value: count,
                })
            }
            _ => None,
        })
        .collect()
}

/// Rows for entries scored as weak.
pub fn weak_rows(payload: &VaultPayload, reports: &[StrengthReport]) -> Vec<ReportRow> {
    let labels = entry_labels(payload);
    reports
        .iter()
        .filter(|report| report.is_weak())
        .map(|report| {
            let (title, username) = labels.get(&report.id).cloned().unwrap_or_default();
            ReportRow {
                title,
                username,
                value: u64::from(report.score),
            }
        })
        .collect()
}

pub fn write_report(path: &Path, kind: ReportKind, rows: &[ReportRow]) -> Result<(), FortibitError> {
    let csv_err = |e: csv::Error| match e.into_kind() {
        csv::ErrorKind::Io(io) => FortibitError::io(path, io),
        other => FortibitError::Internal(format!("cannot write report: {other:?}")),
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["title", "username", kind.value_column()])
        .map_err(csv_err)?;
    for row in rows {
        writer
            .write_record([row.title.as_str(), row.username.as_str(), &row.value.to_string()])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| FortibitError::io(path, e))
}

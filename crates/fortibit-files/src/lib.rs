// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault file manager for Fortibit.
//!
//! Tracks which vault each window has open, unlocks and saves vaults through
//! the isolated crypto worker, writes files crash-safely, keeps recovery
//! snapshots and the recently-opened list, and locks idle windows.

pub mod atomic;
pub mod idle;
pub mod manager;
pub mod recent;
pub mod recovery;
pub mod report;
pub mod window;

pub use idle::run_idle_monitor;
pub use manager::{FileManager, ManagerSettings};
pub use report::{ReportKind, ReportRow};
pub use window::{LockEvent, LockReason};

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fortibit integration tests.
//!
//! # Components
//!
//! - [`ScriptedDialog`] - File dialog returning pre-configured outcomes
//! - [`MemoryStorage`] - Reversible secure-storage stand-in that records calls
//! - [`fixtures`] - Vault payload builders
//! - [`TestHarness`] - Temp data directory plus a matching configuration

pub mod dialog;
pub mod fixtures;
pub mod harness;
pub mod storage;

pub use dialog::ScriptedDialog;
pub use harness::TestHarness;
pub use storage::MemoryStorage;

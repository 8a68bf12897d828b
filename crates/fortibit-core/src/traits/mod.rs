// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator interfaces consumed by the vault core.
//!
//! The desktop shell supplies implementations; the core only depends on these
//! traits.

pub mod dialog;
pub mod secure_storage;

pub use dialog::FileDialogProvider;
pub use secure_storage::SecureStorage;

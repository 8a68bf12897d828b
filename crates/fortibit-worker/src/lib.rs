// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Isolated crypto worker for the Fortibit vault.
//!
//! All operations that need the master password, or that reveal entry
//! secrets, run in a short-lived worker: a blocking task ([`ThreadSpawner`])
//! or a child process ([`ProcessSpawner`]). The host sends one
//! [`WorkerRequest`], receives one [`WorkerResponse`], and the worker is gone.

pub mod client;
pub mod handler;
pub mod protocol;
pub mod spawn;
pub mod stdio;
pub mod strength;

pub use client::WorkerClient;
pub use protocol::{SecretText, StrengthReport, WorkerErrorKind, WorkerRequest, WorkerResponse};
pub use spawn::{ProcessSpawner, ThreadSpawner, WorkerHandle, WorkerSpawner};
pub use stdio::run_stdio_worker;

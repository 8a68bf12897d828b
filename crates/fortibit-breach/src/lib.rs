// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breach checking via k-anonymity range queries.
//!
//! Each secret is hashed with SHA-1; only the first five hex characters of
//! the digest are sent to the range endpoint, and the returned
//! `SUFFIX:COUNT` list is matched locally.

pub mod client;
pub mod response;
pub mod unit;

pub use client::{BreachOutcome, BreachReport, RangeClient, RangeSettings};
pub use unit::BreachQueryUnit;

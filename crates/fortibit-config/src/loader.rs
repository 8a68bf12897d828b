// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./fortibit.toml` > `~/.config/fortibit/fortibit.toml` > `/etc/fortibit/fortibit.toml`
//! with environment variable overrides via `FORTIBIT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FortibitConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/fortibit/fortibit.toml` (system-wide)
/// 3. `~/.config/fortibit/fortibit.toml` (user XDG config)
/// 4. `./fortibit.toml` (local directory)
/// 5. `FORTIBIT_*` environment variables
pub fn load_config() -> Result<FortibitConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FortibitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FortibitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FortibitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FortibitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FortibitConfig::default()))
        .merge(Toml::file("/etc/fortibit/fortibit.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("fortibit/fortibit.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("fortibit.toml"))
        .merge(env_provider())
}

/// Environment provider with an explicit section mapping.
///
/// `Env::split("_")` would turn `FORTIBIT_LOCK_IDLE_SECONDS` into
/// `lock.idle.seconds`; only the first segment names the section.
/// Variables carrying passphrases or secrets are never read as config.
fn env_provider() -> Env {
    Env::prefixed("FORTIBIT_")
        .ignore(&["VAULT_KEY", "NEW_VAULT_KEY", "ENTRY_SECRET"])
        .map(|key| {
            let key_str = key.as_str();
            let mapped = key_str
                .replacen("app_", "app.", 1)
                .replacen("lock_", "lock.", 1)
                .replacen("worker_", "worker.", 1)
                .replacen("breach_", "breach.", 1);
            mapped.into()
        })
}

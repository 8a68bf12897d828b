// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Fortibit vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Cryptographic parameters (cipher, KDF cost, envelope layout) are
//! deliberately absent: they are compile-time constants in `fortibit-vault`.

use serde::{Deserialize, Serialize};

/// Top-level Fortibit configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FortibitConfig {
    /// Application identity, logging, and data directory.
    #[serde(default)]
    pub app: AppConfig,

    /// Automatic locking behaviour.
    #[serde(default)]
    pub lock: LockConfig,

    /// Isolated crypto worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Breach (exposed password) range-query settings.
    #[serde(default)]
    pub breach: BreachConfig,
}

/// Application identity and filesystem configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for recovery snapshots and the recently-opened list.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Number of entries kept in the recently-opened list.
    #[serde(default = "default_max_recent_files")]
    pub max_recent_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            max_recent_files: default_max_recent_files(),
        }
    }
}

fn default_app_name() -> String {
    "fortibit".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("fortibit"))
        .unwrap_or_else(|| std::path::PathBuf::from(".fortibit"))
        .to_string_lossy()
        .to_string()
}

fn default_max_recent_files() -> usize {
    10
}

/// Automatic lock configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockConfig {
    /// Lock every unlocked window when the OS screen locks.
    #[serde(default = "default_lock_on_system_lock")]
    pub lock_on_system_lock: bool,

    /// Lock a window after this many idle seconds. `0` disables the idle lock.
    #[serde(default = "default_idle_seconds")]
    pub idle_seconds: u64,

    /// Save the vault before locking it.
    #[serde(default)]
    pub save_on_lock: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            lock_on_system_lock: default_lock_on_system_lock(),
            idle_seconds: default_idle_seconds(),
            save_on_lock: false,
        }
    }
}

fn default_lock_on_system_lock() -> bool {
    true
}

fn default_idle_seconds() -> u64 {
    600
}

/// Where worker requests execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerMode {
    /// A blocking task on the runtime's blocking pool, one per request.
    #[default]
    Thread,
    /// A child process (`fortibit worker`), one per request.
    Process,
}

/// Isolated worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Execution backend for worker requests.
    #[serde(default)]
    pub mode: WorkerMode,

    /// Upper bound on one request/response turnaround.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Total attempts per request, each on a freshly spawned worker.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Path of the executable hosting the `worker` subcommand in process mode.
    /// Defaults to the current executable.
    #[serde(default)]
    pub executable: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: WorkerMode::default(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            executable: None,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    2
}

/// Exposed-password range-query configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BreachConfig {
    /// Allow breach scans at all.
    #[serde(default = "default_breach_enabled")]
    pub enabled: bool,

    /// Base URL of the range endpoint. The 5-character prefix is appended as
    /// the last path segment.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_breach_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum range queries in flight at once.
    #[serde(default = "default_breach_concurrency")]
    pub concurrency: usize,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            enabled: default_breach_enabled(),
            api_url: default_api_url(),
            timeout_secs: default_breach_timeout_secs(),
            concurrency: default_breach_concurrency(),
        }
    }
}

fn default_breach_enabled() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.pwnedpasswords.com/range".to_string()
}

fn default_breach_timeout_secs() -> u64 {
    5
}

fn default_breach_concurrency() -> usize {
    8
}

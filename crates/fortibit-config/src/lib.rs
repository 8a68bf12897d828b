// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortibit configuration.
//!
//! Settings are layered from compiled defaults, `/etc/fortibit/fortibit.toml`,
//! the user config directory, `./fortibit.toml` and `FORTIBIT_*` variables.
//! Unknown keys are rejected, and every problem found is returned as a
//! [`ConfigError`] ready for [`render_errors`].
//!
//! ```no_run
//! let config = fortibit_config::load_and_validate().expect("config errors");
//! println!("idle lock after {}s", config.lock.idle_seconds);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{FortibitConfig, WorkerMode};

/// Load from the standard locations and validate.
pub fn load_and_validate() -> Result<FortibitConfig, Vec<ConfigError>> {
    let config = checked(loader::load_config(), standard_sources)?;
    tracing::debug!(data_dir = %config.app.data_dir, "configuration loaded");
    Ok(config)
}

/// Load from a TOML string (no files, env still applies) and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<FortibitConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load from one explicit file (env still applies) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<FortibitConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_sources([path.to_path_buf()])
    })
}

/// Validate a loaded config, or convert the load error. `sources` is only
/// read on failure, to underline offending keys.
fn checked(
    loaded: Result<FortibitConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<FortibitConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn standard_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join("fortibit.toml"))
        .unwrap_or_else(|_| PathBuf::from("fortibit.toml"));
    let user = dirs::config_dir().map(|dir| dir.join("fortibit").join("fortibit.toml"));
    let system = PathBuf::from("/etc/fortibit/fortibit.toml");

    read_sources(std::iter::once(local).chain(user).chain(std::iter::once(system)))
}

fn read_sources(paths: impl IntoIterator<Item = PathBuf>) -> Vec<(String, String)> {
    paths
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            Some((path.display().to_string(), content))
        })
        .collect()
}

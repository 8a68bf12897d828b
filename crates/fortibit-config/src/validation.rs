// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid URLs, non-empty paths, and non-zero timeouts.

use crate::diagnostic::ConfigError;
use crate::model::FortibitConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FortibitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.name must not be empty".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` must be one of: {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.app.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "app.data_dir must not be empty".to_string(),
        });
    }

    if config.app.max_recent_files == 0 {
        errors.push(ConfigError::Validation {
            message: "app.max_recent_files must be at least 1".to_string(),
        });
    }

    if config.worker.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "worker.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.worker.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "worker.max_attempts must be at least 1".to_string(),
        });
    }

    if let Some(exe) = &config.worker.executable
        && exe.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "worker.executable must not be empty when set".to_string(),
        });
    }

    let api_url = config.breach.api_url.trim();
    if !(api_url.starts_with("https://") || api_url.starts_with("http://")) {
        errors.push(ConfigError::Validation {
            message: format!("breach.api_url `{api_url}` must be an http(s) URL"),
        });
    }

    if config.breach.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "breach.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.breach.concurrency == 0 {
        errors.push(ConfigError::Validation {
            message: "breach.concurrency must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = FortibitConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = FortibitConfig::default();
        config.app.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "app.log_level"));
    }

    #[test]
    fn zero_worker_timeout_fails_validation() {
        let mut config = FortibitConfig::default();
        config.worker.request_timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "worker.request_timeout_secs"));
    }

    #[test]
    fn non_http_breach_url_fails_validation() {
        let mut config = FortibitConfig::default();
        config.breach.api_url = "ftp://example.com/range".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "breach.api_url"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = FortibitConfig::default();
        config.app.data_dir = " ".to_string();
        config.worker.max_attempts = 0;
        config.breach.concurrency = 0;
        config.breach.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn idle_lock_can_be_disabled() {
        let mut config = FortibitConfig::default();
        config.lock.idle_seconds = 0;
        assert!(validate_config(&config).is_ok());
    }
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Fortibit configuration system.

use fortibit_config::diagnostic::{suggest_key, ConfigError};
use fortibit_config::model::{FortibitConfig, WorkerMode};
use fortibit_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_fortibit_config() {
    let toml = r#"
[app]
name = "vault-test"
log_level = "debug"
data_dir = "/tmp/fortibit-test"
max_recent_files = 5

[lock]
lock_on_system_lock = false
idle_seconds = 120
save_on_lock = true

[worker]
mode = "process"
request_timeout_secs = 30
max_attempts = 3
executable = "/usr/local/bin/fortibit"

[breach]
enabled = false
api_url = "http://127.0.0.1:9000/range"
timeout_secs = 2
concurrency = 4
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.app.name, "vault-test");
    assert_eq!(config.app.log_level, "debug");
    assert_eq!(config.app.data_dir, "/tmp/fortibit-test");
    assert_eq!(config.app.max_recent_files, 5);
    assert!(!config.lock.lock_on_system_lock);
    assert_eq!(config.lock.idle_seconds, 120);
    assert!(config.lock.save_on_lock);
    assert_eq!(config.worker.mode, WorkerMode::Process);
    assert_eq!(config.worker.request_timeout_secs, 30);
    assert_eq!(config.worker.max_attempts, 3);
    assert_eq!(
        config.worker.executable.as_deref(),
        Some("/usr/local/bin/fortibit")
    );
    assert!(!config.breach.enabled);
    assert_eq!(config.breach.api_url, "http://127.0.0.1:9000/range");
    assert_eq!(config.breach.timeout_secs, 2);
    assert_eq!(config.breach.concurrency, 4);
}

/// Unknown field in [lock] section is rejected.
#[test]
fn unknown_field_in_lock_produces_error() {
    let toml = r#"
[lock]
idle_secnds = 30
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("idle_secnds"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Cryptographic parameters are not configurable.
#[test]
fn kdf_cost_is_not_a_config_key() {
    let toml = r#"
[vault]
kdf_log_n = 10
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// Missing sections fall back to compiled defaults.
#[test]
fn missing_optional_sections_use_defaults() {
    let toml = r#"
[app]
name = "minimal"
"#;

    let config = load_config_from_str(toml).expect("partial config should load");
    assert_eq!(config.app.name, "minimal");
    assert_eq!(config.lock.idle_seconds, 600);
    assert!(config.lock.lock_on_system_lock);
    assert_eq!(config.worker.mode, WorkerMode::Thread);
    assert_eq!(config.worker.max_attempts, 2);
    assert_eq!(config.breach.timeout_secs, 5);
}

/// Serialized defaults provide sensible values for all fields.
#[test]
fn serialized_defaults_are_sensible() {
    let config = FortibitConfig::default();

    assert_eq!(config.app.name, "fortibit");
    assert_eq!(config.app.log_level, "info");
    assert_eq!(config.app.max_recent_files, 10);
    assert!(config.app.data_dir.ends_with("fortibit"));
    assert!(!config.lock.save_on_lock);
    assert_eq!(config.worker.request_timeout_secs, 60);
    assert!(config.worker.executable.is_none());
    assert!(config.breach.enabled);
    assert_eq!(config.breach.api_url, "https://api.pwnedpasswords.com/range");
    assert_eq!(config.breach.concurrency, 8);
}

/// `FORTIBIT_LOCK_IDLE_SECONDS` maps to `lock.idle_seconds`, not `lock.idle.seconds`.
#[test]
fn env_var_overrides_nested_key() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "fortibit.toml",
            r#"
[lock]
idle_seconds = 30
"#,
        )?;
        jail.set_env("FORTIBIT_LOCK_IDLE_SECONDS", "45");
        jail.set_env("FORTIBIT_BREACH_API_URL", "http://localhost:1234/range");

        let config = fortibit_config::load_config().expect("env override should load");
        assert_eq!(config.lock.idle_seconds, 45);
        assert_eq!(config.breach.api_url, "http://localhost:1234/range");
        Ok(())
    });
}

/// The vault passphrase variable shares the prefix but is never treated as config.
#[test]
fn vault_key_env_is_not_a_config_key() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("FORTIBIT_VAULT_KEY", "hunter2");
        let config = fortibit_config::load_config().expect("passphrase env must be ignored");
        assert_eq!(config.app.name, "fortibit");
        Ok(())
    });
}

/// An explicit config path is loaded with validation.
#[test]
fn load_and_validate_path_reads_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[worker]\nmode = \"process\"\n").expect("write config");

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.worker.mode, WorkerMode::Process);
}

/// Missing config files in the hierarchy are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    figment::Jail::expect_with(|_jail| {
        let config = fortibit_config::load_and_validate().expect("defaults should validate");
        assert_eq!(config.app.name, "fortibit");
        Ok(())
    });
}

/// Fuzzy matching suggests the closest key.
#[test]
fn diagnostic_api_ulr_suggests_api_url() {
    let suggestion = suggest_key("api_ulr", &["enabled", "api_url", "timeout_secs", "concurrency"]);
    assert_eq!(suggestion.as_deref(), Some("api_url"));
}

/// Error output from load_and_validate_str includes the unknown key and valid keys.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[lock]
idle_secnds = 30
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "idle_secnds"
                && suggestion.as_deref() == Some("idle_seconds")
                && valid_keys.contains("lock_on_system_lock")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'idle_secnds', got: {errors:?}"
    );
}

/// An unrecognized worker mode suggests the closest accepted value.
#[test]
fn diagnostic_unknown_worker_mode() {
    let toml = r#"
[worker]
mode = "proces"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown mode");
    let has_variant = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownVariant { value, suggestion, .. } if {
            value == "proces" && suggestion.as_deref() == Some("process")
        })
    });
    assert!(has_variant, "should have UnknownVariant error, got: {errors:?}");
}

/// Invalid type (string where number expected) produces clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[breach]
concurrency = "many"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("concurrency"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// ConfigError can be rendered using miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "idle_secnds".to_string(),
        suggestion: Some("idle_seconds".to_string()),
        valid_keys: "lock_on_system_lock, idle_seconds, save_on_lock".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `idle_seconds`"), "got: {help}");

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("idle_secnds"));
}

/// Validation errors surface through load_and_validate_str.
#[test]
fn validation_catches_zero_concurrency() {
    let toml = r#"
[breach]
concurrency = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero concurrency should fail");
    let has_validation_error = errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("breach.concurrency"))
    });
    assert!(has_validation_error, "got: {errors:?}");
}

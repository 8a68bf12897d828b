// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or FORTIBIT_VAULT_KEY environment variable.

use fortibit_core::FortibitError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const VAULT_KEY_ENV_VAR: &str = "FORTIBIT_VAULT_KEY";

/// Environment variable holding the new password for `change-password`.
pub const NEW_VAULT_KEY_ENV_VAR: &str = "FORTIBIT_NEW_VAULT_KEY";

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Some(SecretString::from(key)),
        _ => None,
    }
}

fn read_tty(label: &str) -> Result<String, FortibitError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map_err(|e| FortibitError::Internal(format!("failed to read password: {e}")))
}

fn no_password_error(var: &str) -> FortibitError {
    FortibitError::Config(format!(
        "no master password provided. Set {var} or run interactively."
    ))
}

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `FORTIBIT_VAULT_KEY` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_vault_passphrase() -> Result<SecretString, FortibitError> {
    if let Some(key) = from_env(VAULT_KEY_ENV_VAR) {
        return Ok(key);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let passphrase = read_tty("Master password")?;
        if passphrase.is_empty() {
            return Err(FortibitError::Config("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(no_password_error(VAULT_KEY_ENV_VAR))
}

/// Get a new master password, prompting twice to confirm on a TTY.
///
/// `env_var` is consulted first and needs no confirmation.
pub fn get_vault_passphrase_with_confirm(env_var: &str) -> Result<SecretString, FortibitError> {
    if let Some(key) = from_env(env_var) {
        return Ok(key);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let pass1 = read_tty("New master password")?;
        let pass2 = read_tty("Confirm master password")?;

        if pass1 != pass2 {
            return Err(FortibitError::Config("passwords do not match".to_string()));
        }
        if pass1.is_empty() {
            return Err(FortibitError::Config("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(pass1));
    }

    Err(no_password_error(env_var))
}

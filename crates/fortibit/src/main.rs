// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortibit - an encrypted password vault.
//!
//! This is the binary entry point. It also hosts the hidden `worker`
//! subcommand that process-mode crypto workers run.

mod dialog;
mod scan;
mod vault;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

/// Fortibit - an encrypted password vault.
#[derive(Parser, Debug)]
#[command(name = "fortibit", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty vault.
    Create { path: PathBuf },
    /// Unlock a vault and list its entries.
    Open {
        path: PathBuf,
        /// Print the password of the entry with this id.
        #[arg(long)]
        reveal: Option<i64>,
        /// Restore unsaved changes from the recovery snapshot.
        #[arg(long)]
        recover: bool,
    },
    /// Add a password entry.
    Add {
        path: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        username: String,
    },
    /// Re-encrypt a vault under a new master password.
    ChangePassword { path: PathBuf },
    /// Check every password against the breach corpus.
    CheckLeaks {
        path: PathBuf,
        /// Also write a CSV report here.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// List passwords that score as weak.
    WeakPasswords {
        path: PathBuf,
        /// Also write a CSV report here.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show recently opened vaults.
    Recent,
    /// Serve one crypto request on stdin/stdout.
    #[command(hide = true)]
    Worker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout belongs to the protocol; nothing else may write there.
    if let Commands::Worker = cli.command {
        init_tracing("warn");
        return match fortibit_worker::run_stdio_worker().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "worker request failed");
                ExitCode::FAILURE
            }
        };
    }

    let loaded = match &cli.config {
        Some(path) => fortibit_config::load_and_validate_path(path),
        None => fortibit_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            fortibit_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Commands::Create { path } => vault::run_create(&config, &path).await,
        Commands::Open {
            path,
            reveal,
            recover,
        } => vault::run_open(&config, &path, reveal, recover).await,
        Commands::Add {
            path,
            title,
            username,
        } => vault::run_add(&config, &path, &title, &username).await,
        Commands::ChangePassword { path } => vault::run_change_password(&config, &path).await,
        Commands::CheckLeaks { path, report } => scan::run_check_leaks(&config, &path, report).await,
        Commands::WeakPasswords { path, report } => {
            scan::run_weak_passwords(&config, &path, report).await
        }
        Commands::Recent => vault::run_recent(&config).await,
        Commands::Worker => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("fortibit: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so command output stays clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fortibit={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn worker_subcommand_is_hidden_but_parses() {
        let cli = Cli::try_parse_from(["fortibit", "worker"]).unwrap();
        assert!(matches!(cli.command, Commands::Worker));
        let help = Cli::command().render_help().to_string();
        assert!(!help.contains("worker"));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = fortibit_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.app.name, "fortibit");
    }
}

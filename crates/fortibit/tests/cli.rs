// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the `fortibit` binary.
//!
//! Every command runs with process-mode workers, so each crypto request goes
//! through a `fortibit worker` child.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

struct Env {
    dir: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("home")).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self, password: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_fortibit"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("HOME", self.path("home"))
            .env("XDG_CONFIG_HOME", self.path("home"))
            .env("FORTIBIT_APP_DATA_DIR", self.path("data"))
            .env("FORTIBIT_WORKER_MODE", "process")
            .env("FORTIBIT_BREACH_ENABLED", "false")
            .env("FORTIBIT_VAULT_KEY", password)
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, password: &str, args: &[&str]) -> Output {
        self.command(password, args).output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn create_with_entry(env: &Env) -> PathBuf {
    let vault = env.path("personal.fbit");
    let created = env.run("master", &["create", path_arg(&vault)]);
    assert!(created.status.success(), "{}", stderr(&created));
    assert!(stdout(&created).contains("personal.fbit"));

    let added = env
        .command("master", &["add", path_arg(&vault), "--title", "Mail", "--username", "me"])
        .env("FORTIBIT_ENTRY_SECRET", "123456")
        .output()
        .unwrap();
    assert!(added.status.success(), "{}", stderr(&added));
    vault
}

#[test]
fn create_add_open_and_reveal() {
    let env = Env::new();
    let vault = create_with_entry(&env);

    let opened = env.run("master", &["open", path_arg(&vault), "--reveal", "1"]);
    assert!(opened.status.success(), "{}", stderr(&opened));
    let out = stdout(&opened);
    assert!(out.contains("1 entries"));
    assert!(out.contains("Mail"));
    assert!(out.lines().any(|line| line == "123456"));

    // Secrets never reach the file in the clear.
    let on_disk = std::fs::read_to_string(&vault).unwrap();
    assert!(!on_disk.contains("123456"));
    assert!(!env.path("personal~").exists());
}

#[test]
fn wrong_password_is_reported_without_detail() {
    let env = Env::new();
    let vault = create_with_entry(&env);

    let opened = env.run("not-the-password", &["open", path_arg(&vault)]);
    assert!(!opened.status.success());
    assert!(stderr(&opened).contains("password is wrong or the file is damaged"));
    assert!(!stdout(&opened).contains("Mail"));
}

#[test]
fn create_refuses_to_overwrite() {
    let env = Env::new();
    let vault = create_with_entry(&env);
    let before = std::fs::read(&vault).unwrap();

    let again = env.run("other", &["create", path_arg(&vault)]);
    assert!(!again.status.success());
    assert_eq!(std::fs::read(&vault).unwrap(), before);
}

#[test]
fn change_password_reencrypts() {
    let env = Env::new();
    let vault = create_with_entry(&env);

    let changed = env
        .command("master", &["change-password", path_arg(&vault)])
        .env("FORTIBIT_NEW_VAULT_KEY", "next")
        .output()
        .unwrap();
    assert!(changed.status.success(), "{}", stderr(&changed));

    assert!(!env.run("master", &["open", path_arg(&vault)]).status.success());
    let reopened = env.run("next", &["open", path_arg(&vault), "--reveal", "1"]);
    assert!(reopened.status.success(), "{}", stderr(&reopened));
    assert!(stdout(&reopened).lines().any(|line| line == "123456"));
}

#[test]
fn weak_password_report() {
    let env = Env::new();
    let vault = create_with_entry(&env);
    let report = env.path("weak");

    let scanned = env.run(
        "master",
        &["weak-passwords", path_arg(&vault), "--report", path_arg(&report)],
    );
    assert!(scanned.status.success(), "{}", stderr(&scanned));
    assert!(stdout(&scanned).contains("1 of 1 passwords are weak"));

    let csv = std::fs::read_to_string(env.path("weak.csv")).unwrap();
    assert_eq!(csv, "title,username,score\nMail,me,0\n");
}

#[test]
fn leak_check_respects_disabled_setting() {
    let env = Env::new();
    let vault = create_with_entry(&env);

    let scanned = env.run("master", &["check-leaks", path_arg(&vault)]);
    assert!(!scanned.status.success());
    assert!(stderr(&scanned).contains("breach checks are disabled"));
}

#[test]
fn recent_lists_created_vault() {
    let env = Env::new();
    let vault = create_with_entry(&env);

    let recent = env.run("", &["recent"]);
    assert!(recent.status.success(), "{}", stderr(&recent));
    assert_eq!(stdout(&recent).lines().next(), Some(path_arg(&vault)));
}

#[test]
fn worker_answers_malformed_request_with_error_reply() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fortibit"))
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"{\"type\":\"Nope\"}\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let reply: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reply["type"], "Error");
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Worker backends.
//!
//! A [`WorkerSpawner`] produces one-shot [`WorkerHandle`]s. A handle serves
//! exactly one request and is consumed by it, so key material can never
//! outlive the request that carried it.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use fortibit_core::FortibitError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;
use zeroize::Zeroizing;

use crate::handler;
use crate::protocol::{WorkerRequest, WorkerResponse};

/// Environment variables passed through to a process worker.
const PASSTHROUGH_ENV: &[&str] = &["PATH", "HOME", "LANG", "LC_ALL", "TMPDIR", "RUST_LOG"];

/// Largest reply accepted from a process worker.
const MAX_REPLY_BYTES: usize = 64 * 1024 * 1024;

/// Stderr kept from a process worker for error reports. The rest is discarded.
const MAX_STDERR_BYTES: usize = 8 * 1024;

/// Characters of worker stderr quoted in an error.
const STDERR_EXCERPT_CHARS: usize = 500;

/// Starts isolated execution contexts.
#[async_trait]
pub trait WorkerSpawner: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn spawn(&self) -> Result<Box<dyn WorkerHandle>, FortibitError>;
}

/// One live worker. Consumed by its single request.
#[async_trait]
pub trait WorkerHandle: Send {
    async fn request(
        self: Box<Self>,
        request: WorkerRequest,
    ) -> Result<WorkerResponse, FortibitError>;
}

/// Runs each request as its own task; CPU-bound work goes to the blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

struct ThreadWorker;

#[async_trait]
impl WorkerSpawner for ThreadSpawner {
    fn name(&self) -> &str {
        "thread"
    }

    async fn spawn(&self) -> Result<Box<dyn WorkerHandle>, FortibitError> {
        Ok(Box::new(ThreadWorker))
    }
}

#[async_trait]
impl WorkerHandle for ThreadWorker {
    async fn request(
        self: Box<Self>,
        request: WorkerRequest,
    ) -> Result<WorkerResponse, FortibitError> {
        // A panic inside the task surfaces as a JoinError, i.e. a crashed worker.
        tokio::spawn(handler::handle(request))
            .await
            .map_err(|e| FortibitError::WorkerUnavailable(format!("worker task crashed: {e}")))
    }
}

/// Runs each request in a child process (`<executable> worker`).
///
/// The request is written to the child's stdin as one JSON line; the reply is
/// read from its stdout. The child inherits only a minimal environment.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    executable: PathBuf,
    args: Vec<String>,
    max_reply_bytes: usize,
}

impl ProcessSpawner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: vec!["worker".to_string()],
            max_reply_bytes: MAX_REPLY_BYTES,
        }
    }

    /// Replace the arguments passed to the executable.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Cap the reply size. A worker that writes more is killed.
    pub fn with_max_reply_bytes(mut self, max_reply_bytes: usize) -> Self {
        self.max_reply_bytes = max_reply_bytes;
        self
    }

    /// Spawn the currently running executable.
    pub fn current_exe() -> Result<Self, FortibitError> {
        let exe = std::env::current_exe().map_err(|e| {
            FortibitError::WorkerUnavailable(format!("cannot locate current executable: {e}"))
        })?;
        Ok(Self::new(exe))
    }
}

struct ProcessWorker {
    child: tokio::process::Child,
    max_reply_bytes: usize,
}

#[async_trait]
impl WorkerSpawner for ProcessSpawner {
    fn name(&self) -> &str {
        "process"
    }

    async fn spawn(&self) -> Result<Box<dyn WorkerHandle>, FortibitError> {
        let mut cmd = tokio::process::Command::new(&self.executable);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .env_clear();
        for key in PASSTHROUGH_ENV {
            if let Ok(val) = std::env::var(key) {
                cmd.env(key, val);
            }
        }

        let child = cmd.spawn().map_err(|e| {
            FortibitError::WorkerUnavailable(format!(
                "failed to spawn {}: {e}",
                self.executable.display()
            ))
        })?;
        debug!(pid = child.id(), "process worker spawned");
        Ok(Box::new(ProcessWorker {
            child,
            max_reply_bytes: self.max_reply_bytes,
        }))
    }
}

#[async_trait]
impl WorkerHandle for ProcessWorker {
    async fn request(
        mut self: Box<Self>,
        request: WorkerRequest,
    ) -> Result<WorkerResponse, FortibitError> {
        let mut line = Zeroizing::new(serde_json::to_vec(&request).map_err(|e| {
            FortibitError::Internal(format!("cannot encode worker request: {e}"))
        })?);
        drop(request);
        line.push(b'\n');

        let mut stdin = self
            .child
            .stdin
            .take()
            .ok_or_else(|| FortibitError::WorkerUnavailable("worker stdin closed".to_string()))?;
        stdin
            .write_all(&line)
            .await
            .map_err(|e| FortibitError::WorkerUnavailable(format!("cannot write request: {e}")))?;
        drop(stdin);

        let stdout = self
            .child
            .stdout
            .take()
            .ok_or_else(|| FortibitError::WorkerUnavailable("worker stdout closed".to_string()))?;
        let stderr = self.child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut captured = Vec::new();
            if let Some(mut stderr) = stderr {
                let _ = (&mut stderr)
                    .take(MAX_STDERR_BYTES as u64)
                    .read_to_end(&mut captured)
                    .await;
                // Discard the rest; the pipe must not fill up.
                let _ = tokio::io::copy(&mut stderr, &mut tokio::io::sink()).await;
            }
            captured
        });

        let mut stdout_buf = Zeroizing::new(Vec::new());
        let read = stdout
            .take(self.max_reply_bytes as u64 + 1)
            .read_to_end(&mut *stdout_buf)
            .await;
        if let Err(e) = read {
            stderr_task.abort();
            return Err(FortibitError::WorkerUnavailable(format!("cannot read reply: {e}")));
        }
        if stdout_buf.len() > self.max_reply_bytes {
            let _ = self.child.start_kill();
            stderr_task.abort();
            return Err(FortibitError::WorkerUnavailable(format!(
                "worker reply exceeds {} bytes",
                self.max_reply_bytes
            )));
        }

        let status = self
            .child
            .wait()
            .await
            .map_err(|e| FortibitError::WorkerUnavailable(format!("worker process error: {e}")))?;
        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(FortibitError::WorkerUnavailable(format!(
                "worker exited with {status}: {}",
                stderr_excerpt(&stderr)
            )));
        }

        let reply = stdout_buf
            .split(|b| *b == b'\n')
            .find(|l| !l.iter().all(u8::is_ascii_whitespace))
            .ok_or_else(|| FortibitError::WorkerUnavailable("worker sent no reply".to_string()))?;
        serde_json::from_slice(reply)
            .map_err(|e| FortibitError::WorkerUnavailable(format!("malformed worker reply: {e}")))
    }
}

/// The first [`STDERR_EXCERPT_CHARS`] characters of `stderr`, lossily decoded.
fn stderr_excerpt(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .chars()
        .take(STDERR_EXCERPT_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortibit_vault::create_session_key;

    use crate::protocol::SecretText;

    #[tokio::test]
    async fn thread_worker_serves_one_request() {
        let key = create_session_key().unwrap();
        let handle = ThreadSpawner.spawn().await.unwrap();
        let response = handle
            .request(WorkerRequest::EncryptString {
                plain: SecretText::new("abc"),
                session_key: key.clone(),
            })
            .await
            .unwrap();
        match response {
            WorkerResponse::Encrypted { encrypted } => {
                assert_eq!(key.cipher().decrypt(&encrypted).unwrap().as_str(), "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_executable_is_worker_unavailable() {
        let spawner = ProcessSpawner::new("/nonexistent/fortibit-worker-binary");
        let result = spawner.spawn().await;
        assert!(matches!(result, Err(FortibitError::WorkerUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn crashing_process_is_worker_unavailable() {
        let spawner = ProcessSpawner::new("/bin/sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; exit 3".to_string(),
        ]);
        let handle = spawner.spawn().await.unwrap();
        let result = handle
            .request(WorkerRequest::DecryptString {
                encrypted: "x".to_string(),
                session_key: create_session_key().unwrap(),
            })
            .await;
        assert!(matches!(result, Err(FortibitError::WorkerUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn garbage_reply_is_worker_unavailable() {
        let spawner = ProcessSpawner::new("/bin/sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; echo not-json".to_string(),
        ]);
        let handle = spawner.spawn().await.unwrap();
        let result = handle
            .request(WorkerRequest::DecryptString {
                encrypted: "x".to_string(),
                session_key: create_session_key().unwrap(),
            })
            .await;
        assert!(matches!(result, Err(FortibitError::WorkerUnavailable(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn multibyte_stderr_is_cut_on_a_char_boundary() {
        // 499 ASCII bytes, then a 3-byte euro sign straddling byte 500.
        let spawner = ProcessSpawner::new("/bin/sh").with_args(vec![
            "-c".to_string(),
            r"cat > /dev/null; printf '%0499d' 0 >&2; printf '\342\202\254tail' >&2; exit 1"
                .to_string(),
        ]);
        let handle = spawner.spawn().await.unwrap();
        let result = handle
            .request(WorkerRequest::DecryptString {
                encrypted: "x".to_string(),
                session_key: create_session_key().unwrap(),
            })
            .await;
        match result {
            Err(FortibitError::WorkerUnavailable(message)) => {
                assert!(message.contains('\u{20ac}'), "{message}");
                assert!(!message.contains("tail"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stderr_excerpt_counts_characters() {
        let text = "\u{20ac}".repeat(STDERR_EXCERPT_CHARS + 10);
        assert_eq!(stderr_excerpt(text.as_bytes()).chars().count(), STDERR_EXCERPT_CHARS);
        assert_eq!(stderr_excerpt(&[0xff, b'a']), "\u{fffd}a");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn oversized_reply_is_cut_off_while_worker_still_writes() {
        let spawner = ProcessSpawner::new("/bin/sh")
            .with_args(vec!["-c".to_string(), "cat > /dev/null; yes".to_string()])
            .with_max_reply_bytes(4096);
        let handle = spawner.spawn().await.unwrap();
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            handle.request(WorkerRequest::DecryptString {
                encrypted: "x".to_string(),
                session_key: create_session_key().unwrap(),
            }),
        )
        .await
        .expect("request returned while the worker was still writing");
        assert!(
            matches!(&result, Err(FortibitError::WorkerUnavailable(m)) if m.contains("exceeds 4096")),
            "got {result:?}"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn noisy_stderr_does_not_block_the_reply() {
        let spawner = ProcessSpawner::new("/bin/sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; head -c 1048576 /dev/zero >&2; echo not-json".to_string(),
        ]);
        let handle = spawner.spawn().await.unwrap();
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            handle.request(WorkerRequest::DecryptString {
                encrypted: "x".to_string(),
                session_key: create_session_key().unwrap(),
            }),
        )
        .await
        .expect("worker blocked on stderr");
        assert!(
            matches!(&result, Err(FortibitError::WorkerUnavailable(m)) if m.contains("malformed")),
            "got {result:?}"
        );
    }
}

// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-side worker client: spawn, send one request, await one reply.

use std::sync::Arc;
use std::time::Duration;

use fortibit_breach::{BreachReport, RangeSettings};
use fortibit_config::model::{WorkerConfig, WorkerMode};
use fortibit_core::FortibitError;
use fortibit_vault::{SessionKey, VaultPayload};
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::protocol::{SecretText, StrengthReport, WorkerRequest, WorkerResponse};
use crate::spawn::{ProcessSpawner, ThreadSpawner, WorkerSpawner};

/// Issues worker requests with a timeout and a bounded number of fresh-worker retries.
#[derive(Clone)]
pub struct WorkerClient {
    spawner: Arc<dyn WorkerSpawner>,
    timeout: Duration,
    max_attempts: u32,
}

impl std::fmt::Debug for WorkerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerClient")
            .field("spawner", &self.spawner.name())
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl WorkerClient {
    pub fn new(spawner: Arc<dyn WorkerSpawner>, timeout: Duration, max_attempts: u32) -> Self {
        Self {
            spawner,
            timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Build a client for the configured backend.
    pub fn from_config(config: &WorkerConfig) -> Result<Self, FortibitError> {
        let spawner: Arc<dyn WorkerSpawner> = match config.mode {
            WorkerMode::Thread => Arc::new(ThreadSpawner),
            WorkerMode::Process => match &config.executable {
                Some(exe) => Arc::new(ProcessSpawner::new(exe)),
                None => Arc::new(ProcessSpawner::current_exe()?),
            },
        };
        Ok(Self::new(
            spawner,
            Duration::from_secs(config.request_timeout_secs),
            config.max_attempts,
        ))
    }

    /// Send `request` to a freshly spawned worker.
    ///
    /// Spawn failures, crashes, malformed replies and timeouts are retried on a
    /// new worker up to the attempt limit, then reported as
    /// [`FortibitError::WorkerUnavailable`]. An error reply from the worker is
    /// a typed failure and is not retried.
    pub async fn request(&self, request: WorkerRequest) -> Result<WorkerResponse, FortibitError> {
        let kind = request.kind();
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                warn!(request = kind, attempt, error = %last_error, "retrying on a fresh worker");
            }

            let outcome = tokio::time::timeout(self.timeout, async {
                let handle = self.spawner.spawn().await?;
                handle.request(request.clone()).await
            })
            .await;

            match outcome {
                Ok(Ok(WorkerResponse::Error { kind: error_kind, message })) => {
                    debug!(request = kind, ?error_kind, "worker reported failure");
                    return Err(error_kind.into_error(message));
                }
                Ok(Ok(response)) => {
                    debug!(request = kind, attempt, "worker replied");
                    return Ok(response);
                }
                Ok(Err(e)) if e.is_retryable() => last_error = e.to_string(),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    last_error = format!("no reply within {:?}", self.timeout);
                }
            }
        }

        Err(FortibitError::WorkerUnavailable(format!(
            "{kind} failed after {} attempt(s): {last_error}",
            self.max_attempts
        )))
    }

    pub async fn encrypt_database(
        &self,
        payload: VaultPayload,
        password: &str,
        session_key: &SessionKey,
    ) -> Result<String, FortibitError> {
        let response = self
            .request(WorkerRequest::EncryptDatabase {
                payload,
                password: SecretText::new(password),
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::Encrypted { encrypted } => Ok(encrypted),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn decrypt_database(
        &self,
        envelope: String,
        password: &str,
        session_key: &SessionKey,
    ) -> Result<VaultPayload, FortibitError> {
        let response = self
            .request(WorkerRequest::DecryptDatabase {
                envelope,
                password: SecretText::new(password),
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::Decrypted { payload } => Ok(payload),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn encrypt_string(
        &self,
        plain: &str,
        session_key: &SessionKey,
    ) -> Result<String, FortibitError> {
        let response = self
            .request(WorkerRequest::EncryptString {
                plain: SecretText::new(plain),
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::Encrypted { encrypted } => Ok(encrypted),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn decrypt_string(
        &self,
        encrypted: &str,
        session_key: &SessionKey,
    ) -> Result<Zeroizing<String>, FortibitError> {
        let response = self
            .request(WorkerRequest::DecryptString {
                encrypted: encrypted.to_string(),
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::DecryptedString { plain } => Ok(Zeroizing::new(plain.expose().to_string())),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn bulk_encrypt(
        &self,
        items: Vec<Value>,
        session_key: &SessionKey,
    ) -> Result<Vec<Value>, FortibitError> {
        let response = self
            .request(WorkerRequest::BulkEncryptString {
                items,
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::BulkEncrypted { items } => Ok(items),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn bulk_decrypt(
        &self,
        items: Vec<Value>,
        session_key: &SessionKey,
    ) -> Result<Vec<Value>, FortibitError> {
        let response = self
            .request(WorkerRequest::BulkDecryptString {
                items,
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::BulkDecrypted { items } => Ok(items),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn get_leaks(
        &self,
        payload: VaultPayload,
        session_key: &SessionKey,
        range: RangeSettings,
    ) -> Result<Vec<BreachReport>, FortibitError> {
        let response = self
            .request(WorkerRequest::GetLeaks {
                payload,
                session_key: session_key.clone(),
                range,
            })
            .await?;
        match response {
            WorkerResponse::Leaks { reports } => Ok(reports),
            other => Err(unexpected(&other)),
        }
    }

    pub async fn get_weak_passwords(
        &self,
        payload: VaultPayload,
        session_key: &SessionKey,
    ) -> Result<Vec<StrengthReport>, FortibitError> {
        let response = self
            .request(WorkerRequest::GetWeakPasswords {
                payload,
                session_key: session_key.clone(),
            })
            .await?;
        match response {
            WorkerResponse::WeakPasswords { reports } => Ok(reports),
            other => Err(unexpected(&other)),
        }
    }
}

fn unexpected(response: &WorkerResponse) -> FortibitError {
    FortibitError::WorkerUnavailable(format!("unexpected worker reply {}", response.kind()))
}

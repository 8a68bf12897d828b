// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Child-process side of [`crate::spawn::ProcessSpawner`]: read one request
//! line, write one reply line, exit.

use fortibit_core::FortibitError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use zeroize::Zeroizing;

use crate::handler;
use crate::protocol::{WorkerRequest, WorkerResponse};

/// Serve exactly one request from `reader`, replying on `writer`.
pub async fn serve_one<R, W>(mut reader: R, mut writer: W) -> Result<(), FortibitError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Zeroizing::new(String::new());
    reader
        .read_line(&mut line)
        .await
        .map_err(|e| FortibitError::Internal(format!("cannot read request: {e}")))?;

    let response = match serde_json::from_str::<WorkerRequest>(&line) {
        Ok(request) => handler::handle(request).await,
        Err(e) => WorkerResponse::from_error(&FortibitError::Internal(format!(
            "malformed request: {e}"
        ))),
    };
    drop(line);

    let mut reply = Zeroizing::new(
        serde_json::to_vec(&response)
            .map_err(|e| FortibitError::Internal(format!("cannot encode reply: {e}")))?,
    );
    reply.push(b'\n');
    writer
        .write_all(&reply)
        .await
        .map_err(|e| FortibitError::Internal(format!("cannot write reply: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| FortibitError::Internal(format!("cannot write reply: {e}")))
}

/// Entry point of the `worker` subcommand.
pub async fn run_stdio_worker() -> Result<(), FortibitError> {
    serve_one(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

use super::envelope::{RpcRequest, RpcResponse};
use super::error::ToolError;
use super::transport::ToolTransport;
use crate::config::StdioServerConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

struct Process {
    child: Child,
    writer: BufWriter<ChildStdin>,
    reader: Lines<BufReader<ChildStdout>>,
}

/// Subprocess transport. Requests and responses share one duplex pipe, so
/// calls on one instance are mutually exclusive: the process mutex is held
/// for the full write/read exchange.
pub struct StdioTransport {
    config: StdioServerConfig,
    process: AsyncMutex<Option<Process>>,
    next_id: AtomicU64,
}

impl StdioTransport {
    pub fn new(config: StdioServerConfig) -> Self {
        Self {
            config,
            process: AsyncMutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    fn spawn(&self) -> Result<Process, ToolError> {
        let mut command = Command::new(&self.config.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.config.workdir {
            command.current_dir(dir);
        }
        if !self.config.args.is_empty() {
            command.args(&self.config.args);
        }
        for (key, value) in &self.config.env {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            server: self.config.name.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.transport_error("failed to capture server stdout"))?;

        debug!(server = %self.config.name, command = %self.config.command.display(), "spawned tool server process");
        Ok(Process {
            child,
            writer: BufWriter::new(stdin),
            reader: BufReader::new(stdout).lines(),
        })
    }

    async fn exchange(
        &self,
        process: &mut Process,
        request_id: u64,
        encoded: &str,
    ) -> Result<RpcResponse, ToolError> {
        process
            .writer
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        process
            .writer
            .write_all(b"\n")
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;
        process
            .writer
            .flush()
            .await
            .map_err(|source| self.transport_error(source.to_string()))?;

        loop {
            let line = process
                .reader
                .next_line()
                .await
                .map_err(|source| self.transport_error(source.to_string()))?;
            let Some(raw) = line else {
                return Err(ToolError::Terminated {
                    server: self.config.name.clone(),
                });
            };

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('\u{1b}') {
                debug!(
                    server = %self.config.name,
                    line = trimmed,
                    "skipping non-JSON ANSI log line from tool server"
                );
                continue;
            }

            let response: RpcResponse = match serde_json::from_str(trimmed) {
                Ok(response) => response,
                Err(source) => {
                    warn!(
                        server = %self.config.name,
                        line = raw,
                        %source,
                        "received invalid JSON from tool server"
                    );
                    continue;
                }
            };

            if response.answers(request_id) {
                return Ok(response);
            }
            // Notifications and stale responses are not ours to answer.
            debug!(
                server = %self.config.name,
                response_id = ?response.id,
                "skipping unsolicited message from tool server"
            );
        }
    }

    fn transport_error(&self, message: impl Into<String>) -> ToolError {
        ToolError::Transport {
            server: self.config.name.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ToolTransport for StdioTransport {
    fn server_name(&self) -> &str {
        &self.config.name
    }

    async fn connect(&self) -> Result<(), ToolError> {
        let mut guard = self.process.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        *guard = Some(self.spawn()?);
        Ok(())
    }

    async fn disconnect(&self) {
        let mut guard = self.process.lock().await;
        if let Some(mut process) = guard.take() {
            if let Err(err) = process.child.kill().await {
                debug!(
                    server = %self.config.name,
                    %err,
                    "failed to kill tool server process (may have already exited)"
                );
            }
            let _ = process.child.wait().await;
        }
    }

    async fn send(&self, method: &str, params: Value) -> Result<RpcResponse, ToolError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        let encoded = serde_json::to_string(&request).map_err(|source| ToolError::InvalidJson {
            server: self.config.name.clone(),
            source,
        })?;

        let mut guard = self.process.lock().await;
        let process = guard.as_mut().ok_or_else(|| ToolError::NotConnected {
            server: self.config.name.clone(),
        })?;

        let outcome = self.exchange(process, id, &encoded).await;
        if matches!(
            outcome,
            Err(ToolError::Terminated { .. }) | Err(ToolError::Transport { .. })
        ) {
            // The pipe is gone; reap the child so the next connect respawns.
            if let Some(mut dead) = guard.take() {
                let _ = dead.child.kill().await;
                let _ = dead.child.wait().await;
            }
        }
        outcome
    }
}

//! One provider process and its stdio channels.
//!
//! A session is short-lived: it is created for a single validation or tool
//! call and always ends with [`ProviderSession::shutdown`].

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use provisio_runtime::process::{OutputLine, OutputSource, StderrTail, spawn_line_reader};
use provisio_runtime::{LaunchSpec, ProcessLauncher, TerminationPolicy};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestIds, parse_line};

/// How long to wait for stderr to flush once the process is gone.
const STDERR_DRAIN: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to provider stdin: {0}")]
    Write(#[from] io::Error),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Provider stdin is closed")]
    Closed,
}

/// What the provider did next.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Message(JsonRpcResponse),
    /// Stdout closed and the process exited (status unknown if waiting failed).
    Exited(Option<ExitStatus>),
}

pub(crate) struct ProviderSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: mpsc::UnboundedReceiver<OutputLine>,
    stderr: StderrTail,
    stderr_task: Option<JoinHandle<()>>,
    ids: RequestIds,
    started: Instant,
    policy: TerminationPolicy,
    command: String,
}

impl ProviderSession {
    pub(crate) fn spawn(
        launcher: &dyn ProcessLauncher,
        spec: &LaunchSpec,
        policy: TerminationPolicy,
    ) -> Result<Self, SessionError> {
        let command = spec.command_line();
        let mut child = launcher.launch(spec).map_err(|source| SessionError::Spawn {
            command: command.clone(),
            source,
        })?;
        let started = Instant::now();

        let (tx, stdout) = mpsc::unbounded_channel();
        if let Some(out) = child.stdout.take() {
            spawn_line_reader(out, OutputSource::Stdout, tx);
        }
        let stderr = StderrTail::default();
        let stderr_task = child.stderr.take().map(|err| stderr.capture(err));

        debug!(command = %command, pid = ?child.id(), "provider session started");
        Ok(Self {
            stdin: child.stdin.take(),
            child,
            stdout,
            stderr,
            stderr_task,
            ids: RequestIds::new(),
            started,
            policy,
            command,
        })
    }

    pub(crate) fn command(&self) -> &str {
        &self.command
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Captured stderr. After an exit, waits briefly for the reader to
    /// catch up so the last lines are included.
    pub(crate) async fn stderr_text(&mut self) -> String {
        if let Some(task) = self.stderr_task.take() {
            let _ = tokio::time::timeout(STDERR_DRAIN, task).await;
        }
        self.stderr.snapshot()
    }

    /// Give the provider time to start. Returns early with the exit status
    /// if it dies in the meantime.
    pub(crate) async fn settle(&mut self, delay: Duration) -> Option<ExitStatus> {
        if delay.is_zero() {
            return self.child.try_wait().ok().flatten();
        }
        tokio::select! {
            () = tokio::time::sleep(delay) => None,
            status = self.child.wait() => status.ok(),
        }
    }

    /// Send a request and return its correlation id.
    pub(crate) async fn request(&mut self, method: &str, params: Option<Value>) -> Result<u64, SessionError> {
        let id = self.ids.next_id();
        self.write(&JsonRpcRequest::new(id, method, params)).await?;
        debug!(id, method, "sent request");
        Ok(id)
    }

    pub(crate) async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), SessionError> {
        self.write(&JsonRpcNotification::new(method, params)).await
    }

    async fn write<T: Serialize + Sync>(&mut self, message: &T) -> Result<(), SessionError> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        let stdin = self.stdin.as_mut().ok_or(SessionError::Closed)?;
        stdin.write_all(&line).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// Next response from stdout, or the process exit once stdout closes.
    ///
    /// Not bounded in time; callers wrap it in their own deadline.
    pub(crate) async fn next_event(&mut self) -> SessionEvent {
        while let Some(OutputLine { line, .. }) = self.stdout.recv().await {
            if let Some(message) = parse_line(&line) {
                return SessionEvent::Message(message);
            }
        }
        SessionEvent::Exited(self.child.wait().await.ok())
    }

    /// Wait for the process to exit, up to `limit`.
    ///
    /// Stdout is drained meanwhile so a chatty provider cannot block on a
    /// full pipe.
    pub(crate) async fn wait_exit(&mut self, limit: Duration) -> Option<ExitStatus> {
        let deadline = Instant::now() + limit;
        let mut stdout_open = true;
        loop {
            tokio::select! {
                status = self.child.wait() => return status.ok(),
                line = self.stdout.recv(), if stdout_open => {
                    stdout_open = line.is_some();
                }
                () = tokio::time::sleep_until(deadline) => return None,
            }
        }
    }

    /// Stop listening, then terminate and reap the process.
    pub(crate) async fn shutdown(mut self) -> Option<ExitStatus> {
        self.stdout.close();
        drop(self.stdin.take());
        match self.policy.terminate(&mut self.child).await {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(command = %self.command, error = %e, "failed to terminate provider");
                None
            }
        }
    }
}

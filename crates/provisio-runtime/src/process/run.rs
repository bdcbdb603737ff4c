//! Run a process to completion under a deadline while streaming its output.

use std::collections::VecDeque;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, warn};

use super::launcher::{LaunchSpec, ProcessLauncher};
use super::shutdown::TerminationPolicy;
use super::stream::{OutputLine, OutputSource, spawn_line_reader};

/// Lines kept from the end of the combined output.
const TAIL_LINES: usize = 40;

/// Exit status and the tail of combined stdout/stderr.
#[derive(Debug)]
pub struct CommandOutcome {
    pub status: ExitStatus,
    pub tail: Vec<String>,
}

impl CommandOutcome {
    pub fn tail_text(&self) -> String {
        self.tail.join("\n")
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` did not finish within {timeout:?}")]
    TimedOut {
        command: String,
        timeout: Duration,
        tail: Vec<String>,
    },

    #[error("failed waiting for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Spawn `spec`, forward every output line to `on_line`, and wait for exit.
///
/// Stdin is closed immediately. On timeout the child is terminated with
/// `policy` before returning, so no process outlives the call.
pub async fn run_streaming<F>(
    launcher: &dyn ProcessLauncher,
    spec: &LaunchSpec,
    timeout: Duration,
    policy: TerminationPolicy,
    mut on_line: F,
) -> Result<CommandOutcome, RunError>
where
    F: FnMut(&OutputLine) + Send,
{
    let command = spec.command_line();
    let mut child = launcher.launch(spec).map_err(|source| RunError::Spawn {
        command: command.clone(),
        source,
    })?;
    drop(child.stdin.take());

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_line_reader(stdout, OutputSource::Stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, OutputSource::Stderr, tx.clone());
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut tail = VecDeque::with_capacity(TAIL_LINES);

    loop {
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else { break };
                on_line(&line);
                if tail.len() == TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line.line);
            }
            () = sleep_until(deadline) => {
                return Err(timed_out(&mut child, policy, command, timeout, tail).await);
            }
        }
    }

    match timeout_at(deadline, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(command = %command, ?status, "process finished");
            Ok(CommandOutcome {
                status,
                tail: tail.into(),
            })
        }
        Ok(Err(source)) => Err(RunError::Wait { command, source }),
        Err(_) => Err(timed_out(&mut child, policy, command, timeout, tail).await),
    }
}

async fn timed_out(
    child: &mut tokio::process::Child,
    policy: TerminationPolicy,
    command: String,
    timeout: Duration,
    tail: VecDeque<String>,
) -> RunError {
    warn!(command = %command, timeout_ms = timeout.as_millis(), "process timed out, terminating");
    if let Err(e) = policy.terminate(child).await {
        warn!(command = %command, error = %e, "failed to terminate timed out process");
    }
    RunError::TimedOut {
        command,
        timeout,
        tail: tail.into(),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::{TokioLauncher, pid_exists};

    fn sh(script: &str) -> LaunchSpec {
        LaunchSpec::new("sh", ["-c", script])
    }

    #[tokio::test]
    async fn test_collects_both_streams() {
        let mut seen = Vec::new();
        let outcome = run_streaming(
            &TokioLauncher,
            &sh("echo out; echo err >&2; exit 0"),
            Duration::from_secs(5),
            TerminationPolicy::immediate(),
            |l| seen.push(l.source),
        )
        .await
        .unwrap();

        assert!(outcome.status.success());
        assert_eq!(outcome.tail.len(), 2);
        assert!(seen.contains(&OutputSource::Stdout));
        assert!(seen.contains(&OutputSource::Stderr));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_an_outcome() {
        let outcome = run_streaming(
            &TokioLauncher,
            &sh("echo boom; exit 7"),
            Duration::from_secs(5),
            TerminationPolicy::immediate(),
            |_| {},
        )
        .await
        .unwrap();
        assert_eq!(outcome.status.code(), Some(7));
        assert_eq!(outcome.tail_text(), "boom");
    }

    #[tokio::test]
    async fn test_timeout_terminates() {
        let spec = sh("echo $$ ; exec sleep 30");
        let mut pid = None;
        let err = run_streaming(
            &TokioLauncher,
            &spec,
            Duration::from_millis(300),
            TerminationPolicy::new(Duration::from_millis(200)),
            |l| pid = l.line.trim().parse::<u32>().ok(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::TimedOut { .. }));
        assert!(!pid_exists(pid.unwrap()));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let err = run_streaming(
            &TokioLauncher,
            &LaunchSpec::new("/no/such/binary", Vec::<String>::new()),
            Duration::from_secs(1),
            TerminationPolicy::immediate(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }
}

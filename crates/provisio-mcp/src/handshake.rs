//! The two-step handshake shared by validation and execution.
//!
//! `initialize` (id 1) must be answered with a capabilities object before
//! `notifications/initialized` and the second request (id 2) are sent. The
//! first response to id 2 ends the exchange. Responses to other ids,
//! duplicates and responses arriving out of turn are ignored.

use std::process::ExitStatus;
use std::time::Duration;

use provisio_core::FailureKind;
use provisio_runtime::{LaunchSpec, ProcessLauncher, TerminationPolicy};
use serde_json::Value;
use tracing::debug;

use crate::protocol::{initialize_params, methods};
use crate::session::{ProviderSession, SessionError, SessionEvent};

/// How long to wait for an exit after a failed write before calling it a
/// protocol failure.
const WRITE_FAILURE_EXIT_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy)]
pub(crate) struct HandshakeConfig {
    pub settle_delay: Duration,
    /// Covers everything from spawn to the final response.
    pub timeout: Duration,
    pub early_exit_threshold: Duration,
    pub policy: TerminationPolicy,
}

#[derive(Debug)]
pub(crate) struct Completed {
    pub capabilities: Value,
    /// `result` of the second request.
    pub result: Value,
    /// Spawn to final response.
    pub elapsed: Duration,
}

#[derive(Debug)]
pub(crate) struct Failed {
    pub kind: FailureKind,
    pub message: String,
    pub elapsed: Duration,
}

enum Stage {
    Initializing { id: u64 },
    Awaiting { id: u64, capabilities: Value },
}

/// Spawn `spec`, run the handshake ending in `method`, and tear the process
/// down. The process is always terminated before this returns.
pub(crate) async fn run(
    launcher: &dyn ProcessLauncher,
    spec: &LaunchSpec,
    config: HandshakeConfig,
    method: &str,
    params: Option<Value>,
) -> Result<Completed, Failed> {
    let mut session = match ProviderSession::spawn(launcher, spec, config.policy) {
        Ok(session) => session,
        Err(e) => {
            return Err(Failed {
                kind: FailureKind::Spawn,
                message: format!("Could not start provider: {e}"),
                elapsed: Duration::ZERO,
            });
        }
    };

    let driven = tokio::time::timeout(
        config.timeout,
        drive(&mut session, &config, method, params),
    )
    .await;
    let outcome = match driven {
        Ok(outcome) => outcome,
        Err(_) => Err(Failed {
            kind: FailureKind::Timeout,
            message: format!(
                "Provider `{}` did not complete the handshake within {} ms",
                session.command(),
                config.timeout.as_millis()
            ),
            elapsed: session.elapsed(),
        }),
    };

    session.shutdown().await;
    outcome
}

async fn drive(
    session: &mut ProviderSession,
    config: &HandshakeConfig,
    method: &str,
    mut params: Option<Value>,
) -> Result<Completed, Failed> {
    if let Some(status) = session.settle(config.settle_delay).await {
        return Err(exit_failure(session, Some(status), config).await);
    }

    let id = match session
        .request(methods::INITIALIZE, Some(initialize_params()))
        .await
    {
        Ok(id) => id,
        Err(e) => return Err(write_failure(session, &e, config).await),
    };
    let mut stage = Stage::Initializing { id };

    loop {
        let message = match session.next_event().await {
            SessionEvent::Message(message) => message,
            SessionEvent::Exited(status) => return Err(exit_failure(session, status, config).await),
        };
        let received = message.correlation_id();
        let expected = match &stage {
            Stage::Initializing { id } | Stage::Awaiting { id, .. } => *id,
        };
        if received != Some(expected) {
            debug!(id = ?received, expected, "ignoring response with unexpected id");
            continue;
        }

        match stage {
            Stage::Initializing { id } => {
                if let Some(error) = message.error {
                    return Err(protocol_failure(session, format!("initialize was rejected: {error}")));
                }
                let Some(capabilities) = message
                    .result
                    .and_then(|mut result| result.get_mut("capabilities").map(Value::take))
                    .filter(Value::is_object)
                else {
                    debug!("initialize response without capabilities, still waiting");
                    stage = Stage::Initializing { id };
                    continue;
                };

                if let Err(e) = session.notify(methods::INITIALIZED, None).await {
                    return Err(write_failure(session, &e, config).await);
                }
                let id = match session.request(method, params.take()).await {
                    Ok(id) => id,
                    Err(e) => return Err(write_failure(session, &e, config).await),
                };
                stage = Stage::Awaiting { id, capabilities };
            }
            Stage::Awaiting { capabilities, .. } => {
                if let Some(error) = message.error {
                    return Err(protocol_failure(session, format!("{method} failed: {error}")));
                }
                let Some(result) = message.result else {
                    return Err(protocol_failure(session, format!("{method} response has no result")));
                };
                return Ok(Completed {
                    capabilities,
                    result,
                    elapsed: session.elapsed(),
                });
            }
        }
    }
}

fn protocol_failure(session: &ProviderSession, message: String) -> Failed {
    Failed {
        kind: FailureKind::Protocol,
        message,
        elapsed: session.elapsed(),
    }
}

/// A closed stdin usually means the process died; classify as an exit when
/// it did.
async fn write_failure(
    session: &mut ProviderSession,
    error: &SessionError,
    config: &HandshakeConfig,
) -> Failed {
    match session.wait_exit(WRITE_FAILURE_EXIT_WAIT).await {
        Some(status) => exit_failure(session, Some(status), config).await,
        None => protocol_failure(session, format!("Could not send request: {error}")),
    }
}

/// Exits before the handshake finished. Fast exits usually mean a bad
/// command or a missing runtime dependency.
async fn exit_failure(
    session: &mut ProviderSession,
    status: Option<ExitStatus>,
    config: &HandshakeConfig,
) -> Failed {
    let elapsed = session.elapsed();
    let code = describe_exit(status);
    let stderr = session.stderr_text().await;
    let detail = if stderr.is_empty() {
        String::new()
    } else {
        format!("\nstderr:\n{stderr}")
    };

    if elapsed < config.early_exit_threshold {
        Failed {
            kind: FailureKind::EarlyExit,
            message: format!(
                "Provider crashed on startup ({code} after {} ms); check the command and its dependencies{detail}",
                elapsed.as_millis()
            ),
            elapsed,
        }
    } else {
        Failed {
            kind: FailureKind::UnexpectedExit,
            message: format!(
                "Provider exited unexpectedly during the handshake ({code} after {} ms){detail}",
                elapsed.as_millis()
            ),
            elapsed,
        }
    }
}

fn describe_exit(status: Option<ExitStatus>) -> String {
    match status.and_then(|s| s.code()) {
        Some(code) => format!("exit code {code}"),
        None if status.is_some() => "killed by signal".to_string(),
        None => "unknown exit status".to_string(),
    }
}

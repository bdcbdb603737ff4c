//! Shared package-manager driver used by every installer.

use provisio_core::ProgressReporter;
use tracing::{debug, info, warn};

use super::error::InstallError;
use super::progress::ProgressEstimator;
use crate::environment::EnvironmentManager;
use crate::process::{LaunchSpec, run_streaming};

/// Run one package-manager command to completion, streaming progress.
///
/// A non-zero exit is fatal. The returned lines are the tail of the
/// combined output.
pub(crate) async fn run_package_manager(
    envs: &EnvironmentManager,
    provider_id: &str,
    spec: &LaunchSpec,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<String>, InstallError> {
    let command = spec.command_line();
    let mut estimator = ProgressEstimator::new();
    reporter.report(&estimator.started(format!("Running {command}")));
    info!(provider_id = %provider_id, command = %command, "running package manager");

    let outcome = run_streaming(
        envs.launcher(),
        spec,
        envs.install_config().timeout(),
        envs.install_policy(),
        |line| {
            debug!(provider_id = %provider_id, output = %line.line, "package manager output");
            reporter.report(&estimator.observe(&line.line));
        },
    )
    .await?;

    if !outcome.status.success() {
        warn!(
            provider_id = %provider_id,
            command = %command,
            code = ?outcome.status.code(),
            "package manager failed"
        );
        return Err(InstallError::CommandFailed {
            command,
            code: outcome.status.code(),
            output_tail: outcome.tail_text(),
        });
    }

    Ok(outcome.tail)
}

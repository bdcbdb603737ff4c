//! Protocol validation: confirm a provider speaks MCP and harvest its tools.

use std::sync::Arc;
use std::time::Duration;

use provisio_core::{
    FailureKind, InstallEnvironment, LaunchConfig, SimpleValidation, ToolDescriptor,
    ValidationConfig, ValidationResult,
};
use provisio_runtime::{LaunchSpec, ProcessLauncher, TerminationPolicy};
use tracing::{info, warn};

use crate::handshake::{self, HandshakeConfig};
use crate::protocol::methods;
use crate::session::ProviderSession;

/// Spawns a provider and runs `initialize` then `tools/list`.
pub struct ProtocolValidator {
    launcher: Arc<dyn ProcessLauncher>,
    config: ValidationConfig,
}

impl ProtocolValidator {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, config: ValidationConfig) -> Self {
        Self { launcher, config }
    }

    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    const fn policy(&self) -> TerminationPolicy {
        TerminationPolicy::new(self.config.kill_grace())
    }

    /// Strict validation.
    ///
    /// `timeout` (default from config) bounds the whole handshake. Never
    /// fails; problems are reported in the result.
    pub async fn validate(
        &self,
        env: &InstallEnvironment,
        config: &LaunchConfig,
        timeout: Option<Duration>,
    ) -> ValidationResult {
        let spec = LaunchSpec::for_environment(env, config.env.as_ref());
        let handshake_config = HandshakeConfig {
            settle_delay: self.config.settle_delay(),
            timeout: timeout.unwrap_or_else(|| self.config.timeout()),
            early_exit_threshold: self.config.early_exit_threshold(),
            policy: self.policy(),
        };

        match handshake::run(
            self.launcher.as_ref(),
            &spec,
            handshake_config,
            methods::TOOLS_LIST,
            None,
        )
        .await
        {
            Ok(done) => {
                let tools = ToolDescriptor::list_from_wire(&done.result);
                info!(
                    command = %spec.command_line(),
                    tools = tools.len(),
                    elapsed_ms = done.elapsed.as_millis(),
                    "provider protocol confirmed"
                );
                ValidationResult::confirmed(tools, Some(done.capabilities))
            }
            Err(failed) => {
                warn!(
                    command = %spec.command_line(),
                    failure = %failed.kind,
                    error = %failed.message,
                    "protocol validation failed"
                );
                ValidationResult::failed(failed.kind, failed.message)
            }
        }
    }

    /// Degraded check: the provider starts and does not crash.
    ///
    /// Success when the process is still running at the deadline or exited
    /// with status 0. Non-zero exits and spawn errors fail.
    pub async fn simple_validate(
        &self,
        env: &InstallEnvironment,
        config: &LaunchConfig,
        timeout: Option<Duration>,
    ) -> SimpleValidation {
        let spec = LaunchSpec::for_environment(env, config.env.as_ref());
        let timeout = timeout.unwrap_or_else(|| self.config.simple_timeout());

        let mut session = match ProviderSession::spawn(self.launcher.as_ref(), &spec, self.policy()) {
            Ok(session) => session,
            Err(e) => return SimpleValidation::failed(format!("Could not start provider: {e}")),
        };

        let result = match session.wait_exit(timeout).await {
            None => SimpleValidation::ok(),
            Some(status) if status.success() => SimpleValidation::ok(),
            Some(status) => {
                let stderr = session.stderr_text().await;
                let mut message = format!("Provider exited with {status}");
                if !stderr.is_empty() {
                    message.push_str(": ");
                    message.push_str(&stderr);
                }
                SimpleValidation::failed(message)
            }
        };

        session.shutdown().await;
        result
    }

    /// Strict validation, falling back to the simple check when enabled.
    ///
    /// A fallback success is a degraded result: `protocol` is `unknown`, no
    /// tools are known and `error` explains why the strict check failed.
    pub async fn validate_with_fallback(
        &self,
        env: &InstallEnvironment,
        config: &LaunchConfig,
    ) -> ValidationResult {
        let strict = self.validate(env, config, None).await;
        if strict.success || !self.config.fallback_enabled {
            return strict;
        }
        // A spawn failure will not go away on a second attempt.
        if strict.failure == Some(FailureKind::Spawn) {
            return strict;
        }

        warn!(executable = %env.executable, "falling back to simple start validation");
        let simple = self.simple_validate(env, config, None).await;
        let strict_error = strict.error.clone().unwrap_or_default();

        if simple.success {
            ValidationResult {
                error: Some(format!("Protocol not confirmed: {strict_error}")),
                ..ValidationResult::degraded()
            }
        } else {
            ValidationResult {
                error: Some(format!(
                    "{strict_error}; simple start check also failed: {}",
                    simple.error.unwrap_or_default()
                )),
                ..strict
            }
        }
    }
}

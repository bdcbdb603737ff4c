//! Tool execution. Every call gets a fresh provider process.

use std::sync::Arc;
use std::time::Duration;

use provisio_core::{
    ExecutionConfig, ExecutionResult, FailureKind, InstallEnvironment, LaunchConfig,
    ToolDescriptor, validate_parameters,
};
use provisio_runtime::{LaunchSpec, ProcessLauncher, TerminationPolicy};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::handshake::{self, HandshakeConfig};
use crate::protocol::{first_text, methods, tool_call_params};

/// Exits faster than this are reported as crashes on startup.
const EARLY_EXIT_THRESHOLD: Duration = Duration::from_secs(1);

pub struct ToolExecutor {
    launcher: Arc<dyn ProcessLauncher>,
    config: ExecutionConfig,
}

impl ToolExecutor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, config: ExecutionConfig) -> Self {
        Self { launcher, config }
    }

    pub const fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run `tool_name` with `args` on a new instance of the provider.
    ///
    /// Arguments are checked against the tool's schema in `catalog` before
    /// anything is spawned. An empty catalog (degraded validation) skips the
    /// check. Never fails; problems are reported in the result.
    pub async fn execute(
        &self,
        mcp_id: &str,
        env: &InstallEnvironment,
        config: &LaunchConfig,
        catalog: &[ToolDescriptor],
        tool_name: &str,
        args: &Value,
    ) -> ExecutionResult {
        if let Err(error) = check_arguments(catalog, tool_name, args) {
            debug!(mcp_id, tool = tool_name, error = %error, "rejected tool arguments");
            return ExecutionResult::failed(mcp_id, tool_name, FailureKind::InvalidParameters, error, 0);
        }

        let spec = LaunchSpec::for_environment(env, config.env.as_ref());
        let handshake_config = HandshakeConfig {
            settle_delay: self.config.settle_delay(),
            timeout: self.config.timeout(),
            early_exit_threshold: EARLY_EXIT_THRESHOLD,
            policy: TerminationPolicy::new(self.config.kill_grace()),
        };

        let outcome = handshake::run(
            self.launcher.as_ref(),
            &spec,
            handshake_config,
            methods::TOOLS_CALL,
            Some(tool_call_params(tool_name, args)),
        )
        .await;

        match outcome {
            Ok(done) => {
                let elapsed_ms = millis(done.elapsed);
                let is_error = done
                    .result
                    .get("isError")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                if is_error {
                    let message = first_text(&done.result)
                        .unwrap_or("Tool reported an error")
                        .to_string();
                    warn!(mcp_id, tool = tool_name, error = %message, "tool returned an error");
                    return ExecutionResult::tool_error(mcp_id, tool_name, done.result, message, elapsed_ms);
                }

                info!(mcp_id, tool = tool_name, elapsed_ms, "tool call completed");
                ExecutionResult::succeeded(mcp_id, tool_name, done.result, elapsed_ms)
            }
            Err(failed) => {
                warn!(
                    mcp_id,
                    tool = tool_name,
                    failure = %failed.kind,
                    error = %failed.message,
                    "tool call failed"
                );
                ExecutionResult::failed(
                    mcp_id,
                    tool_name,
                    failed.kind,
                    failed.message,
                    millis(failed.elapsed),
                )
            }
        }
    }
}

fn check_arguments(catalog: &[ToolDescriptor], tool_name: &str, args: &Value) -> Result<(), String> {
    if catalog.is_empty() {
        return Ok(());
    }

    let Some(tool) = catalog.iter().find(|tool| tool.name == tool_name) else {
        let known: Vec<&str> = catalog.iter().map(|tool| tool.name.as_str()).collect();
        return Err(format!(
            "Unknown tool '{tool_name}'. Available tools: {}",
            known.join(", ")
        ));
    };

    let check = validate_parameters(args, tool);
    if check.valid {
        Ok(())
    } else {
        Err(check
            .error
            .unwrap_or_else(|| format!("Invalid arguments for tool '{tool_name}'")))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

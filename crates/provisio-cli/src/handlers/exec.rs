//! Exec handler: calls a single tool and prints its result.

use anyhow::{Context, Result};
use provisio_core::FailureKind;
use serde_json::Value;
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::style::{RED, RESET};

pub async fn execute(ctx: &CliContext, id: &str, tool: &str, raw_args: &str) -> Result<()> {
    let args = parse_arguments(raw_args)?;
    let result = ctx
        .service()
        .execute_tool(id, tool, &args)
        .await
        .map_err(CliError::from)?;

    if let Some(payload) = &result.result {
        let out = serde_json::to_string_pretty(payload).context("Failed to encode tool result")?;
        println!("{out}");
    }

    if result.success {
        debug!(provider_id = %id, tool = %tool, ms = result.execution_time_ms, "tool call finished");
        return Ok(());
    }

    let error = result.error.unwrap_or_else(|| "Tool call failed".to_string());
    eprintln!("{RED}✗ {tool} failed after {} ms{RESET}", result.execution_time_ms);
    let err = match result.failure {
        Some(FailureKind::InvalidParameters) => CliError::Arguments(error),
        _ => CliError::Provider(error),
    };
    Err(err.into())
}

/// Tool arguments must be a JSON object; `null` means none.
fn parse_arguments(raw: &str) -> Result<Value, CliError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CliError::Arguments(format!("--args is not valid JSON: {e}")))?;
    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(serde_json::Map::new())),
        other => Err(CliError::Arguments(format!(
            "--args must be a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(r#"{"city": "Oslo"}"#).unwrap(), json!({"city": "Oslo"}));
        assert_eq!(parse_arguments("null").unwrap(), json!({}));
        assert!(matches!(parse_arguments("[1]"), Err(CliError::Arguments(_))));
        assert!(matches!(parse_arguments("{oops"), Err(CliError::Arguments(_))));
    }
}

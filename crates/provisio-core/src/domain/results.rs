//! Outcomes of validation and tool execution.
//!
//! Both operations report failure through these values instead of `Err`, so
//! callers can persist a status and message without a generic error handler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::ToolDescriptor;

/// Whether the provider completed the protocol handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolStatus {
    /// Full `initialize` + `tools/list` handshake succeeded.
    Confirmed,
    /// Only the degraded simple check was performed (or nothing succeeded).
    Unknown,
}

/// Why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// OS refused to start the process.
    Spawn,
    /// Operation deadline expired.
    Timeout,
    /// Process exited shortly after spawn, usually a bad command or missing dependency.
    EarlyExit,
    /// Process exited in the middle of the handshake.
    UnexpectedExit,
    /// Provider answered with an error or a malformed message.
    Protocol,
    /// Caller arguments did not match the tool schema.
    InvalidParameters,
}

impl FailureKind {
    /// Failures that mean the provider could not be started at all.
    pub const fn is_start_failure(self) -> bool {
        matches!(self, Self::Spawn | Self::EarlyExit)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Spawn => "spawn",
            Self::Timeout => "timeout",
            Self::EarlyExit => "early_exit",
            Self::UnexpectedExit => "unexpected_exit",
            Self::Protocol => "protocol",
            Self::InvalidParameters => "invalid_parameters",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub protocol: ProtocolStatus,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ValidationResult {
    pub const fn confirmed(tools: Vec<ToolDescriptor>, capabilities: Option<Value>) -> Self {
        Self {
            success: true,
            protocol: ProtocolStatus::Confirmed,
            tools,
            capabilities,
            error: None,
            failure: None,
        }
    }

    /// Degraded success from the simple-start fallback: no tools are known.
    pub const fn degraded() -> Self {
        Self {
            success: true,
            protocol: ProtocolStatus::Unknown,
            tools: Vec::new(),
            capabilities: None,
            error: None,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            protocol: ProtocolStatus::Unknown,
            tools: Vec::new(),
            capabilities: None,
            error: Some(error.into()),
            failure: Some(kind),
        }
    }

    /// Full success, as opposed to the degraded fallback.
    pub fn is_confirmed(&self) -> bool {
        self.success && self.protocol == ProtocolStatus::Confirmed
    }
}

/// Outcome of the simple-start check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleValidation {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimpleValidation {
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    pub tool_name: String,
    pub mcp_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl ExecutionResult {
    pub fn succeeded(
        mcp_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: Value,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: true,
            tool_name: tool_name.into(),
            mcp_id: mcp_id.into(),
            result: Some(result),
            error: None,
            execution_time_ms,
            failure: None,
        }
    }

    pub fn failed(
        mcp_id: impl Into<String>,
        tool_name: impl Into<String>,
        kind: FailureKind,
        error: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            tool_name: tool_name.into(),
            mcp_id: mcp_id.into(),
            result: None,
            error: Some(error.into()),
            execution_time_ms,
            failure: Some(kind),
        }
    }

    /// The provider ran the tool and flagged the result as an error
    /// (`isError: true`). The payload is kept.
    pub fn tool_error(
        mcp_id: impl Into<String>,
        tool_name: impl Into<String>,
        result: Value,
        error: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            tool_name: tool_name.into(),
            mcp_id: mcp_id.into(),
            result: Some(result),
            error: Some(error.into()),
            execution_time_ms,
            failure: None,
        }
    }

    /// Keep the provider's payload on a failed result.
    #[must_use]
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_is_not_confirmed() {
        let degraded = ValidationResult::degraded();
        assert!(degraded.success);
        assert!(!degraded.is_confirmed());
        assert!(ValidationResult::confirmed(vec![], None).is_confirmed());
    }

    #[test]
    fn test_execution_result_wire_shape() {
        let r = ExecutionResult::failed("fs", "read", FailureKind::Timeout, "timed out", 30_000);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["toolName"], "read");
        assert_eq!(json["mcpId"], "fs");
        assert_eq!(json["executionTimeMs"], 30_000);
        assert_eq!(json["failure"], "timeout");
        assert!(json.get("result").is_none());
    }
}

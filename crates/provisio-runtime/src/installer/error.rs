//! Installation errors.
//!
//! Keeps error plumbing out of the installers and the orchestrator.

use std::time::Duration;

use thiserror::Error;

use crate::environment::EnvironmentError;
use crate::process::RunError;
use crate::system::ProbeError;

/// Errors that end an installation.
#[derive(Debug, Error)]
pub enum InstallError {
    // === Dependencies ===
    /// A required system tool is missing. Not retryable.
    #[error("Missing required tool `{tool}`. {hint}")]
    MissingDependency { tool: String, hint: String },

    /// No ecosystem has its tools installed.
    #[error("No supported package ecosystem is available (tried npm, python, cargo)")]
    NoEcosystemAvailable,

    // === Subprocess ===
    #[error("Could not start `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` failed with exit code {}: {output_tail}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        output_tail: String,
    },

    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    // === Orchestration ===
    /// Another install of the same provider id is in flight.
    #[error("Provider '{0}' is already being installed")]
    AlreadyInstalling(String),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

impl InstallError {
    /// Whether retrying the same install could succeed without user action.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. } | Self::TimedOut { .. } | Self::AlreadyInstalling(_)
        )
    }
}

impl From<ProbeError> for InstallError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Missing { tool, hint } => Self::MissingDependency {
                tool,
                hint: hint.to_string(),
            },
        }
    }
}

impl From<RunError> for InstallError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Spawn { command, source } => Self::Spawn {
                command,
                reason: source.to_string(),
            },
            RunError::TimedOut {
                command, timeout, ..
            } => Self::TimedOut { command, timeout },
            RunError::Wait { command, source } => Self::CommandFailed {
                command,
                code: None,
                output_tail: source.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        let missing: InstallError = ProbeError::Missing {
            tool: "npm".into(),
            hint: "Install Node.js",
        }
        .into();
        assert!(!missing.is_retryable());
        assert!(!InstallError::NoEcosystemAvailable.is_retryable());
        assert!(
            InstallError::TimedOut {
                command: "npm install".into(),
                timeout: Duration::from_secs(1),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_command_failed_message() {
        let err = InstallError::CommandFailed {
            command: "npm install x".into(),
            code: Some(1),
            output_tail: "E404".into(),
        };
        assert_eq!(err.to_string(), "`npm install x` failed with exit code 1: E404");
    }
}

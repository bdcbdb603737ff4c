//! CLI error types and exit codes.

use provisio_mcp::ServiceError;
use provisio_runtime::InstallError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Bad user input that clap could not catch.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A required tool is missing on this machine.
    #[error("{0}")]
    Dependency(String),

    /// Install, validation or tool call failed.
    #[error("{0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CliError {
    /// Exit code following sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,  // EX_USAGE
            Self::Config(_) => 78,    // EX_CONFIG
            Self::Dependency(_) => 69, // EX_UNAVAILABLE
            Self::Provider(_) => 1,
            Self::Storage(_) => 74, // EX_IOERR
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotInstalled(_) | ServiceError::NoEnvironment(_) => {
                Self::Arguments(err.to_string())
            }
            ServiceError::Install(
                InstallError::MissingDependency { .. } | InstallError::NoEcosystemAvailable,
            ) => Self::Dependency(err.to_string()),
            ServiceError::Repository(_) => Self::Storage(err.to_string()),
            ServiceError::Install(_) | ServiceError::Environment(_) => {
                Self::Provider(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency_exit_code() {
        let err: CliError = ServiceError::Install(InstallError::MissingDependency {
            tool: "npx".into(),
            hint: "Install Node.js".into(),
        })
        .into();
        assert_eq!(err.exit_code(), 69);
        assert!(err.to_string().contains("npx"));
    }

    #[test]
    fn test_unknown_provider_is_usage_error() {
        let err: CliError = ServiceError::NotInstalled("ghost".into()).into();
        assert_eq!(err.exit_code(), 2);
    }
}

//! Engine configuration.
//!
//! Every field has a default, so a partial JSON file (or none at all) yields a
//! usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default overall install timeout.
pub const DEFAULT_INSTALL_TIMEOUT_MS: u64 = 300_000;
/// Default protocol validation timeout.
pub const DEFAULT_VALIDATION_TIMEOUT_MS: u64 = 10_000;
/// Default tool execution timeout.
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 30_000;

/// Names or paths of the ecosystem tools the engine invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Runs local JavaScript entry points (`node ./server.js`).
    pub node: String,
    pub npm: String,
    pub npx: String,
    pub python: String,
    pub cargo: String,
    pub git: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            node: "node".to_string(),
            npm: "npm".to_string(),
            npx: "npx".to_string(),
            python: if cfg!(windows) { "python" } else { "python3" }.to_string(),
            cargo: "cargo".to_string(),
            git: "git".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub timeout_ms: u64,
    /// Grace window between the termination signal and a forced kill.
    pub kill_grace_ms: u64,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_INSTALL_TIMEOUT_MS,
            kill_grace_ms: 5_000,
        }
    }
}

impl InstallConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub timeout_ms: u64,
    /// Delay between spawn and the first request.
    pub settle_delay_ms: u64,
    /// Timeout for the simple-start fallback.
    pub simple_timeout_ms: u64,
    /// Exits faster than this are reported as early exits.
    pub early_exit_threshold_ms: u64,
    pub kill_grace_ms: u64,
    /// Whether strict failures fall back to the simple-start check.
    pub fallback_enabled: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_VALIDATION_TIMEOUT_MS,
            settle_delay_ms: 500,
            simple_timeout_ms: 5_000,
            early_exit_threshold_ms: 1_000,
            kill_grace_ms: 1_000,
            fallback_enabled: true,
        }
    }
}

impl ValidationConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub const fn simple_timeout(&self) -> Duration {
        Duration::from_millis(self.simple_timeout_ms)
    }

    pub const fn early_exit_threshold(&self) -> Duration {
        Duration::from_millis(self.early_exit_threshold_ms)
    }

    pub const fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub kill_grace_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_EXECUTION_TIMEOUT_MS,
            settle_delay_ms: 500,
            kill_grace_ms: 1_000,
        }
    }
}

impl ExecutionConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub const fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioConfig {
    pub toolchain: ToolchainConfig,
    pub install: InstallConfig,
    pub validation: ValidationConfig,
    pub execution: ExecutionConfig,
    /// Overrides `<data_root>/providers` as the installation root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_root: Option<PathBuf>,
}

/// Configuration loading or validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Toolchain entry '{0}' cannot be empty")]
    EmptyToolName(&'static str),
}

impl ProvisioConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject zero timeouts and empty toolchain entries.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("install.timeout_ms", self.install.timeout_ms),
            ("validation.timeout_ms", self.validation.timeout_ms),
            ("validation.simple_timeout_ms", self.validation.simple_timeout_ms),
            ("execution.timeout_ms", self.execution.timeout_ms),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::ZeroTimeout(*name));
        }

        let tools = [
            ("node", &self.toolchain.node),
            ("npm", &self.toolchain.npm),
            ("npx", &self.toolchain.npx),
            ("python", &self.toolchain.python),
            ("cargo", &self.toolchain.cargo),
            ("git", &self.toolchain.git),
        ];
        if let Some((name, _)) = tools.iter().find(|(_, cmd)| cmd.trim().is_empty()) {
            return Err(ConfigError::EmptyToolName(*name));
        }

        Ok(())
    }
}

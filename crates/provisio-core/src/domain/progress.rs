//! Installation status and progress events.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a provider installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallStatus {
    CheckingDependencies,
    Downloading,
    Installing,
    Validating,
    Completed,
    Failed,
}

impl InstallStatus {
    /// Whether no further progress events follow this status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CheckingDependencies => "checking-dependencies",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Validating => "validating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Ephemeral progress event emitted during an install.
///
/// Percentages are heuristic UX hints, never exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationProgress {
    pub status: InstallStatus,
    pub message: String,
    /// 0..=100
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,
}

impl InstallationProgress {
    pub fn new(status: InstallStatus, message: impl Into<String>, percentage: u8) -> Self {
        Self {
            status,
            message: message.into(),
            percentage: percentage.min(100),
            logs: None,
        }
    }

    #[must_use]
    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = Some(logs);
        self
    }
}

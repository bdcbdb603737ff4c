//! Persisted installation record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::environment::InstallEnvironment;
use super::launch::LaunchConfig;
use super::progress::InstallStatus;
use super::results::ValidationResult;
use super::tool::ToolDescriptor;

/// Everything the persistence collaborator stores about one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledProvider {
    pub id: String,
    pub config: LaunchConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<InstallEnvironment>,
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
    pub status: InstallStatus,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InstalledProvider {
    /// Fresh record for an install that has just started.
    pub fn new(id: impl Into<String>, config: LaunchConfig, tools: Vec<ToolDescriptor>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            config,
            environment: None,
            tools,
            status: InstallStatus::CheckingDependencies,
            status_message: String::new(),
            logs: Vec::new(),
            validation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the provider finished installing and can be launched.
    pub const fn is_usable(&self) -> bool {
        matches!(self.status, InstallStatus::Completed) && self.environment.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

//! Resolved installation environments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::launch::EnvironmentKind;

/// The concrete, resolved way to relaunch an installed provider.
///
/// Written once at install time and reused unchanged for every later
/// validation or execution until the provider is uninstalled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallEnvironment {
    /// Ecosystem the provider was installed through.
    pub kind: EnvironmentKind,

    /// Per-provider installation directory.
    pub root_path: PathBuf,

    /// Executable to spawn (absolute path or a known interpreter/wrapper name).
    pub executable: String,

    /// Arguments passed to `executable`.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables applied to every launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl InstallEnvironment {
    /// Create an environment with no extra variables.
    pub fn new(
        kind: EnvironmentKind,
        root_path: impl Into<PathBuf>,
        executable: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            kind,
            root_path: root_path.into(),
            executable: executable.into(),
            args,
            env: None,
        }
    }

    /// Append arguments forwarded from the original launch config.
    #[must_use]
    pub fn with_extra_args(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(extra);
        self
    }

    /// Set environment variables applied to every launch.
    #[must_use]
    pub fn with_env(mut self, env: Option<BTreeMap<String, String>>) -> Self {
        self.env = env;
        self
    }

    /// Merge this environment's variables with launch-time overrides.
    ///
    /// Launch-time values win over install-time values.
    pub fn merged_env(&self, overrides: Option<&BTreeMap<String, String>>) -> BTreeMap<String, String> {
        let mut merged = self.env.clone().unwrap_or_default();
        if let Some(overrides) = overrides {
            merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Human-readable command line, for logs and diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

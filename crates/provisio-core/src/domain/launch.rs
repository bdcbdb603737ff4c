//! Launch configuration and ecosystem classification types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw description of how to start a provider, as supplied by a user or catalog.
///
/// Immutable once received; every later step derives from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Command to execute (e.g. `npx`, `python3`, `/opt/tools/server`).
    pub command: String,

    /// Arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables for the provider process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl LaunchConfig {
    /// Create a launch config from a command and its arguments.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: None,
        }
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Arguments that follow the package token, if the token is present.
    ///
    /// These are forwarded to the installed provider unchanged (for example the
    /// directory argument of a filesystem provider).
    pub fn args_after(&self, package: &str) -> Vec<String> {
        self.args
            .iter()
            .position(|arg| arg == package)
            .map(|idx| self.args[idx + 1..].to_vec())
            .unwrap_or_default()
    }
}

/// Package ecosystem a provider is distributed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// JavaScript package registry (npm).
    Js,
    /// Python package index.
    Python,
    /// Rust crate or source build.
    Rust,
    /// Anything else: containers, local binaries, unknown commands.
    Other,
}

impl Ecosystem {
    /// Installable ecosystems in fixed preference order.
    pub const PREFERENCE: [EnvironmentKind; 3] = [
        EnvironmentKind::Js,
        EnvironmentKind::Python,
        EnvironmentKind::Rust,
    ];

    /// The installation environment kind for this ecosystem, if it is installable.
    pub const fn environment_kind(self) -> Option<EnvironmentKind> {
        match self {
            Self::Js => Some(EnvironmentKind::Js),
            Self::Python => Some(EnvironmentKind::Python),
            Self::Rust => Some(EnvironmentKind::Rust),
            Self::Other => None,
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Js => write!(f, "js"),
            Self::Python => write!(f, "python"),
            Self::Rust => write!(f, "rust"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Kind of isolated installation environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Js,
    Python,
    Rust,
}

impl EnvironmentKind {
    /// Directory name of this ecosystem's installation root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Js => "npm",
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }

    /// The ecosystem this environment kind installs from.
    pub const fn ecosystem(self) -> Ecosystem {
        match self {
            Self::Js => Ecosystem::Js,
            Self::Python => Ecosystem::Python,
            Self::Rust => Ecosystem::Rust,
        }
    }
}

impl std::fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.ecosystem().fmt(f)
    }
}

/// Result of classifying a [`LaunchConfig`].
///
/// Derived deterministically and never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemClassification {
    pub ecosystem: Ecosystem,
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// The package is a script already on disk, run directly by its
    /// interpreter with no package-manager step.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub local_entry: bool,
}

impl EcosystemClassification {
    pub fn new(ecosystem: Ecosystem, package_name: impl Into<String>) -> Self {
        Self {
            ecosystem,
            package_name: package_name.into(),
            repository_url: None,
            local_entry: false,
        }
    }

    #[must_use]
    pub fn with_repository(mut self, url: Option<String>) -> Self {
        self.repository_url = url;
        self
    }

    #[must_use]
    pub const fn with_local_entry(mut self) -> Self {
        self.local_entry = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_after_package() {
        let config = LaunchConfig::new(
            "npx",
            ["-y", "@scope/server-filesystem", "/home/me", "/tmp"],
        );
        assert_eq!(
            config.args_after("@scope/server-filesystem"),
            vec!["/home/me".to_string(), "/tmp".to_string()]
        );
        assert!(config.args_after("missing").is_empty());
    }

    #[test]
    fn test_launch_config_env_roundtrip_shape() {
        let config = LaunchConfig::new("uvx", ["mcp-server-git"]).with_env("TOKEN", "abc");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["env"]["TOKEN"], "abc");

        let bare: LaunchConfig = serde_json::from_str(r#"{"command":"node"}"#).unwrap();
        assert!(bare.args.is_empty());
        assert!(bare.env.is_none());
    }

    #[test]
    fn test_other_has_no_environment() {
        assert_eq!(Ecosystem::Other.environment_kind(), None);
        assert_eq!(
            Ecosystem::Python.environment_kind(),
            Some(EnvironmentKind::Python)
        );
    }
}

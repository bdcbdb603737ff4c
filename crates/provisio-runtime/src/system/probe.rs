//! Presence and version checks for ecosystem tool binaries.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Required tool `{tool}` was not found on PATH. {hint}")]
    Missing { tool: String, hint: &'static str },
}

/// Looks up tool binaries.
pub trait SystemProbe: Send + Sync {
    /// Resolved path of `tool`, if it can be run.
    fn find(&self, tool: &str) -> Option<PathBuf>;

    fn require(&self, tool: &str) -> Result<PathBuf, ProbeError> {
        self.find(tool).ok_or_else(|| ProbeError::Missing {
            tool: tool.to_string(),
            hint: install_hint(tool),
        })
    }
}

/// Probe backed by the `which` crate.
///
/// Accepts both bare names (searched on `PATH`) and explicit paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathProbe;

impl SystemProbe for PathProbe {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Installation instructions for a missing tool.
pub fn install_hint(tool: &str) -> &'static str {
    let name = std::path::Path::new(tool)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(tool);

    match name {
        "npm" | "npx" | "node" => "Install Node.js (which provides npm and npx) from https://nodejs.org",
        "uv" | "uvx" => "Install uv with `pip install uv` or see https://docs.astral.sh/uv",
        n if n.starts_with("python") => "Install Python 3 from https://www.python.org/downloads",
        "pip" | "pip3" => "Install pip with `python3 -m ensurepip --upgrade`",
        "cargo" | "rustc" => "Install the Rust toolchain with rustup from https://rustup.rs",
        "git" => "Install git from https://git-scm.com/downloads",
        "docker" => "Install Docker from https://docs.docker.com/get-docker",
        _ => "Install it and make sure it is on PATH",
    }
}

/// First line of `<cmd> --version`, from stdout or stderr.
pub fn tool_version(cmd: &str) -> Option<String> {
    let output = Command::new(cmd).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    // Older Pythons print their version on stderr.
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };
    text.lines().next().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NothingInstalled;

    impl SystemProbe for NothingInstalled {
        fn find(&self, _tool: &str) -> Option<PathBuf> {
            None
        }
    }

    #[test]
    fn test_missing_tool_carries_hint() {
        let err = NothingInstalled.require("npx").unwrap_err();
        let ProbeError::Missing { tool, hint } = &err;
        assert_eq!(tool, "npx");
        assert!(hint.contains("Node.js"));
        assert!(err.to_string().contains("npx"));
    }

    #[test]
    fn test_hints() {
        assert!(install_hint("uvx").contains("pip install uv"));
        assert!(install_hint("/usr/local/bin/cargo").contains("rustup"));
        assert!(install_hint("python3.12").contains("Python"));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_probe_finds_sh() {
        assert!(PathProbe.find("sh").is_some());
        assert!(PathProbe.find("definitely-not-a-real-tool-xyz").is_none());
    }
}

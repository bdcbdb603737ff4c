//! Process-spawning primitive.
//!
//! Every provider, package manager and interpreter is started through a
//! [`ProcessLauncher`], which lets tests count or intercept spawns.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use provisio_core::{EnvironmentKind, InstallEnvironment};
use tokio::process::{Child, Command};
use tracing::debug;

use super::path::build_effective_path;

/// Everything needed to start one process with piped stdio.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
    /// Directories placed in front of the inherited `PATH`.
    pub path_prepend: Vec<PathBuf>,
}

impl LaunchSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Spec for relaunching an installed provider.
    ///
    /// Variables merge in order: inherited process env, then the install
    /// environment's, then `overrides` (the launch config's).
    pub fn for_environment(
        env: &InstallEnvironment,
        overrides: Option<&BTreeMap<String, String>>,
    ) -> Self {
        let mut path_prepend = Vec::new();
        if env.kind == EnvironmentKind::Js {
            path_prepend.push(env.root_path.join("node_modules").join(".bin"));
        }

        Self {
            program: env.executable.clone(),
            args: env.args.clone(),
            env: env.merged_env(overrides),
            cwd: None,
            path_prepend,
        }
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Human-readable command line for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Starts processes.
pub trait ProcessLauncher: Send + Sync {
    /// Spawn with stdin, stdout and stderr all piped.
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child>;
}

/// Launcher backed by `tokio::process`.
///
/// Children get `kill_on_drop`, the effective `PATH`, and on Unix their own
/// process group.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, spec: &LaunchSpec) -> io::Result<Child> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if !spec.env.contains_key("PATH") {
            cmd.env("PATH", build_effective_path(&spec.program, &spec.path_prepend));
        }
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn()?;
        debug!(pid = ?child.id(), command = %spec.command_line(), "spawned process");
        Ok(child)
    }
}

//! Per-ecosystem installation directories, Python virtual environments and
//! launch resolution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use provisio_core::paths::{DirectoryCreationStrategy, ProviderPaths, ensure_directory};
use provisio_core::{
    EnvironmentKind, InstallConfig, InstallEnvironment, ProvisioConfig, ToolchainConfig,
};
use tracing::{debug, info, warn};

use super::error::EnvironmentError;
use crate::process::{LaunchSpec, ProcessLauncher, TerminationPolicy, run_streaming};

/// Outcome of a best-effort directory removal. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub path: PathBuf,
    pub removed: bool,
    pub error: Option<String>,
}

impl CleanupReport {
    fn removed(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            removed: true,
            error: None,
        }
    }

    fn skipped(path: &Path, error: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            removed: false,
            error: Some(error.into()),
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns the installation root and everything under it.
pub struct EnvironmentManager {
    paths: ProviderPaths,
    toolchain: ToolchainConfig,
    install: InstallConfig,
    launcher: Arc<dyn ProcessLauncher>,
}

impl std::fmt::Debug for EnvironmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentManager")
            .field("paths", &self.paths)
            .field("toolchain", &self.toolchain)
            .finish_non_exhaustive()
    }
}

impl EnvironmentManager {
    pub fn new(
        paths: ProviderPaths,
        toolchain: ToolchainConfig,
        install: InstallConfig,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Self {
        Self {
            paths,
            toolchain,
            install,
            launcher,
        }
    }

    /// Build from configuration, defaulting the root to `<data_root>/providers`.
    pub fn from_config(
        config: &ProvisioConfig,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<Self, EnvironmentError> {
        let root = match &config.install_root {
            Some(root) => root.clone(),
            None => provisio_core::providers_root()?,
        };
        Ok(Self::new(
            ProviderPaths::new(root),
            config.toolchain.clone(),
            config.install.clone(),
            launcher,
        ))
    }

    pub const fn paths(&self) -> &ProviderPaths {
        &self.paths
    }

    pub const fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }

    pub const fn install_config(&self) -> &InstallConfig {
        &self.install
    }

    pub fn launcher(&self) -> &dyn ProcessLauncher {
        self.launcher.as_ref()
    }

    /// Termination policy for package-manager subprocesses.
    pub const fn install_policy(&self) -> TerminationPolicy {
        TerminationPolicy::new(self.install.kill_grace())
    }

    /// Create the ecosystem's installation root if needed. Idempotent.
    pub fn ensure_directory(&self, kind: EnvironmentKind) -> Result<PathBuf, EnvironmentError> {
        let root = self.paths.ecosystem_root(kind);
        ensure_directory(&root, DirectoryCreationStrategy::AutoCreate)?;
        Ok(root)
    }

    /// Create (if needed) and return the directory owned by one provider.
    pub fn provider_dir(&self, kind: EnvironmentKind, id: &str) -> Result<PathBuf, EnvironmentError> {
        self.ensure_directory(kind)?;
        let dir = self.paths.provider_dir(kind, id)?;
        ensure_directory(&dir, DirectoryCreationStrategy::AutoCreate)?;
        Ok(dir)
    }

    /// Create the provider's Python virtual environment, or return the existing one.
    ///
    /// The venv is built under a temporary name and renamed into place only
    /// after `python -m venv` succeeds, so a half-built environment is never
    /// mistaken for a usable one.
    pub async fn create_isolated_environment(&self, id: &str) -> Result<PathBuf, EnvironmentError> {
        let dir = self.provider_dir(EnvironmentKind::Python, id)?;
        let venv = dir.join("venv");

        if venv_python(&venv).is_file() {
            debug!(provider_id = %id, venv = %venv.display(), "reusing existing virtual environment");
            return Ok(venv);
        }

        // Leftover from an interrupted run: no interpreter, so not usable.
        if venv.exists() {
            warn!(venv = %venv.display(), "removing incomplete virtual environment");
            remove_dir(&venv).await?;
        }

        let staging = dir.join(format!(".venv-{}", uuid::Uuid::new_v4()));
        let spec = LaunchSpec::new(
            self.toolchain.python.clone(),
            ["-m".to_string(), "venv".to_string(), staging.display().to_string()],
        );
        info!(provider_id = %id, python = %self.toolchain.python, "creating virtual environment");

        let outcome = run_streaming(
            self.launcher(),
            &spec,
            self.install.timeout(),
            self.install_policy(),
            |_| {},
        )
        .await;

        let failure = match outcome {
            Ok(outcome) if outcome.status.success() => None,
            Ok(outcome) => Some(if outcome.tail.is_empty() {
                format!("python exited with {}", outcome.status)
            } else {
                outcome.tail_text()
            }),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = failure {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            return Err(EnvironmentError::VenvCreation { path: venv, reason });
        }

        if let Err(e) = tokio::fs::rename(&staging, &venv).await {
            let _ = tokio::fs::remove_dir_all(&staging).await;
            // A concurrent creation for the same id won the rename.
            if venv_python(&venv).is_file() {
                return Ok(venv);
            }
            return Err(EnvironmentError::Io {
                path: venv,
                source: e,
            });
        }

        Ok(venv)
    }

    /// Compute how to launch an installed provider.
    ///
    /// - JS: `npx --prefix <dir> --yes <package>`
    /// - Python: `<venv>/bin/python -m <module>`
    /// - Rust: `<dir>/bin/<package>`
    ///
    /// `extra_args` are appended unchanged.
    pub fn resolve_launch(
        &self,
        kind: EnvironmentKind,
        id: &str,
        package: &str,
        extra_args: Vec<String>,
    ) -> Result<InstallEnvironment, EnvironmentError> {
        let dir = self.paths.provider_dir(kind, id)?;

        let env = match kind {
            EnvironmentKind::Js => InstallEnvironment::new(
                kind,
                &dir,
                self.toolchain.npx.clone(),
                vec![
                    "--prefix".to_string(),
                    dir.display().to_string(),
                    "--yes".to_string(),
                    package.to_string(),
                ],
            ),
            EnvironmentKind::Python => {
                let python = venv_python(&dir.join("venv"));
                InstallEnvironment::new(
                    kind,
                    &dir,
                    python.display().to_string(),
                    vec!["-m".to_string(), python_module_name(package)],
                )
            }
            EnvironmentKind::Rust => {
                let binary = dir
                    .join("bin")
                    .join(format!("{}{}", rust_binary_name(package), std::env::consts::EXE_SUFFIX));
                InstallEnvironment::new(kind, &dir, binary.display().to_string(), Vec::new())
            }
        };

        Ok(env.with_extra_args(extra_args))
    }

    /// Launch a script already on disk with the configured `node`.
    ///
    /// A relative script is resolved against the current directory, since the
    /// provider runs from its own installation directory later.
    pub fn resolve_local_entry(
        &self,
        id: &str,
        script: &str,
        extra_args: Vec<String>,
    ) -> Result<InstallEnvironment, EnvironmentError> {
        let script_path = std::path::absolute(script).map_err(|source| EnvironmentError::Io {
            path: PathBuf::from(script),
            source,
        })?;
        if !script_path.is_file() {
            return Err(EnvironmentError::MissingEntryPoint(script_path));
        }

        let dir = self.provider_dir(EnvironmentKind::Js, id)?;
        debug!(provider_id = %id, script = %script_path.display(), "using local entry point");

        Ok(InstallEnvironment::new(
            EnvironmentKind::Js,
            &dir,
            self.toolchain.node.clone(),
            vec![script_path.display().to_string()],
        )
        .with_extra_args(extra_args))
    }

    /// Recursively remove `env.root_path`. Failures are logged and reported,
    /// never returned as errors.
    pub async fn cleanup(&self, env: &InstallEnvironment) -> CleanupReport {
        self.cleanup_path(&env.root_path).await
    }

    /// Remove every ecosystem directory belonging to `id`.
    pub async fn cleanup_provider(&self, id: &str) -> Vec<CleanupReport> {
        let mut reports = Vec::new();
        for kind in provisio_core::Ecosystem::PREFERENCE {
            if let Ok(dir) = self.paths.provider_dir(kind, id) {
                if dir.exists() {
                    reports.push(self.cleanup_path(&dir).await);
                }
            }
        }
        reports
    }

    async fn cleanup_path(&self, path: &Path) -> CleanupReport {
        if !path.starts_with(self.paths.root()) || path == self.paths.root() {
            warn!(path = %path.display(), "refusing to remove path outside the installation root");
            return CleanupReport::skipped(path, "path is outside the installation root");
        }
        if !path.exists() {
            return CleanupReport::removed(path);
        }

        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => {
                info!(path = %path.display(), "removed provider directory");
                CleanupReport::removed(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove provider directory");
                CleanupReport::skipped(path, e.to_string())
            }
        }
    }

    /// Pre-flight check: the root exists and the executable resolves.
    pub fn validate(&self, env: &InstallEnvironment) -> Result<(), EnvironmentError> {
        if !env.root_path.is_dir() {
            return Err(EnvironmentError::MissingRoot(env.root_path.clone()));
        }
        if !executable_resolves(&env.executable) {
            return Err(EnvironmentError::UnresolvableExecutable(env.executable.clone()));
        }
        Ok(())
    }
}

/// Interpreter inside a virtual environment.
pub fn venv_python(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

/// Importable module name for a Python distribution name.
///
/// Drops version specifiers and extras, then maps `-` and `.` to `_`:
/// `mcp-server-git==1.0` becomes `mcp_server_git`. For VCS URLs the last
/// path segment is used.
pub fn python_module_name(package: &str) -> String {
    let package = if package.contains("://") || package.starts_with("git+") {
        let segment = package.trim_end_matches('/').rsplit('/').next().unwrap_or(package);
        segment.trim_end_matches(".git")
    } else {
        package
    };

    let name = package
        .split(['=', '<', '>', '!', '~', '[', ';', ' ', '@'])
        .next()
        .unwrap_or(package)
        .trim();
    name.replace(['-', '.'], "_")
}

fn rust_binary_name(package: &str) -> &str {
    package.split('@').next().unwrap_or(package)
}

fn executable_resolves(executable: &str) -> bool {
    let path = Path::new(executable);
    if path.is_absolute() || executable.contains(std::path::MAIN_SEPARATOR) {
        path.is_file()
    } else {
        which::which(executable).is_ok()
    }
}

async fn remove_dir(path: &Path) -> Result<(), EnvironmentError> {
    tokio::fs::remove_dir_all(path)
        .await
        .map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::TokioLauncher;
    use tempfile::tempdir;

    fn manager(root: &Path) -> EnvironmentManager {
        EnvironmentManager::new(
            ProviderPaths::new(root),
            ToolchainConfig::default(),
            InstallConfig::default(),
            Arc::new(TokioLauncher),
        )
    }

    #[test]
    fn test_module_name() {
        assert_eq!(python_module_name("mcp-server-git"), "mcp_server_git");
        assert_eq!(python_module_name("mcp-server-git==1.2"), "mcp_server_git");
        assert_eq!(python_module_name("pkg[cli]>=2"), "pkg");
        assert_eq!(python_module_name("zope.interface"), "zope_interface");
        assert_eq!(
            python_module_name("git+https://github.com/acme/mcp-weather.git"),
            "mcp_weather"
        );
    }

    #[test]
    fn test_ensure_directory_idempotent() {
        let tmp = tempdir().unwrap();
        let envs = manager(tmp.path());
        let a = envs.ensure_directory(EnvironmentKind::Rust).unwrap();
        let b = envs.ensure_directory(EnvironmentKind::Rust).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, tmp.path().join("rust"));
    }

    #[test]
    fn test_resolve_local_entry_runs_node() {
        let tmp = tempdir().unwrap();
        let envs = manager(&tmp.path().join("providers"));
        let script = tmp.path().join("index.js");
        std::fs::write(&script, "").unwrap();

        let env = envs
            .resolve_local_entry("local", &script.display().to_string(), vec!["--stdio".into()])
            .unwrap();
        assert_eq!(env.kind, EnvironmentKind::Js);
        assert_eq!(env.executable, "node");
        assert_eq!(env.args, vec![script.display().to_string(), "--stdio".to_string()]);
        assert!(env.root_path.is_dir());
    }

    #[test]
    fn test_resolve_local_entry_missing_script() {
        let tmp = tempdir().unwrap();
        let envs = manager(tmp.path());
        let missing = tmp.path().join("gone.js");
        let err = envs
            .resolve_local_entry("local", &missing.display().to_string(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, EnvironmentError::MissingEntryPoint(p) if p == missing));
    }

    #[test]
    fn test_resolve_launch_per_ecosystem() {
        let tmp = tempdir().unwrap();
        let envs = manager(tmp.path());

        let js = envs
            .resolve_launch(EnvironmentKind::Js, "fs", "@scope/fs", vec!["/home".into()])
            .unwrap();
        assert_eq!(js.executable, "npx");
        assert_eq!(js.args.last().map(String::as_str), Some("/home"));
        assert!(js.args.contains(&"@scope/fs".to_string()));

        let py = envs
            .resolve_launch(EnvironmentKind::Python, "git", "mcp-server-git", vec![])
            .unwrap();
        assert!(py.executable.ends_with("python") || py.executable.ends_with("python.exe"));
        assert_eq!(py.args, vec!["-m", "mcp_server_git"]);

        let rs = envs
            .resolve_launch(EnvironmentKind::Rust, "srv", "srv@0.3.0", vec![])
            .unwrap();
        assert!(Path::new(&rs.executable).starts_with(tmp.path().join("rust").join("srv").join("bin")));
        assert!(rs.args.is_empty());
    }

    #[test]
    fn test_validate_requires_root_and_executable() {
        let tmp = tempdir().unwrap();
        let envs = manager(tmp.path());
        let env = envs
            .resolve_launch(EnvironmentKind::Rust, "srv", "srv", vec![])
            .unwrap();

        assert!(matches!(envs.validate(&env), Err(EnvironmentError::MissingRoot(_))));

        envs.provider_dir(EnvironmentKind::Rust, "srv").unwrap();
        assert!(matches!(
            envs.validate(&env),
            Err(EnvironmentError::UnresolvableExecutable(_))
        ));

        std::fs::create_dir_all(Path::new(&env.executable).parent().unwrap()).unwrap();
        std::fs::write(&env.executable, "").unwrap();
        assert!(envs.validate(&env).is_ok());
    }

    #[tokio::test]
    async fn test_cleanup_never_fails() {
        let tmp = tempdir().unwrap();
        let envs = manager(tmp.path());
        let dir = envs.provider_dir(EnvironmentKind::Js, "fs").unwrap();
        std::fs::write(dir.join("package.json"), "{}").unwrap();
        let env = envs
            .resolve_launch(EnvironmentKind::Js, "fs", "pkg", vec![])
            .unwrap();

        let report = envs.cleanup(&env).await;
        assert!(report.removed && report.is_ok());
        assert!(!dir.exists());

        // Already gone: still fine.
        assert!(envs.cleanup(&env).await.is_ok());

        // Outside the root: refused, not an error.
        let outside = InstallEnvironment::new(EnvironmentKind::Js, "/", "npx", vec![]);
        let report = envs.cleanup(&outside).await;
        assert!(!report.removed);
        assert!(report.error.is_some());
    }
}

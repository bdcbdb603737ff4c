//! `cargo install` builds into a per-provider root.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use provisio_core::{EnvironmentKind, InstallEnvironment, ProgressReporter};

use super::error::InstallError;
use super::runner::run_package_manager;
use super::{EcosystemInstaller, InstallRequest};
use crate::environment::EnvironmentManager;
use crate::process::LaunchSpec;

#[derive(Debug)]
pub struct RustInstaller {
    envs: Arc<EnvironmentManager>,
}

impl RustInstaller {
    pub const fn new(envs: Arc<EnvironmentManager>) -> Self {
        Self { envs }
    }
}

/// `cargo` is what classification yields when no crate name was given.
fn has_crate_name(request: &InstallRequest) -> bool {
    request.package != "cargo"
}

fn cargo_args(dir: &Path, request: &InstallRequest) -> Vec<String> {
    let mut args = vec![
        "install".to_string(),
        "--root".to_string(),
        dir.display().to_string(),
    ];
    if let Some(url) = &request.repository_url {
        args.push("--git".to_string());
        args.push(url.clone());
    }
    // Without a crate name cargo installs the repository's only binary.
    if has_crate_name(request) || request.repository_url.is_none() {
        args.push(request.package.clone());
    }
    args
}

/// Name of the binary `cargo install` produces.
fn binary_name(request: &InstallRequest) -> String {
    match &request.repository_url {
        Some(url) if !has_crate_name(request) => url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(url)
            .trim_end_matches(".git")
            .to_string(),
        _ => request.package.clone(),
    }
}

#[async_trait]
impl EcosystemInstaller for RustInstaller {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Rust
    }

    fn required_tools(&self) -> Vec<String> {
        let toolchain = self.envs.toolchain();
        vec![toolchain.cargo.clone(), toolchain.git.clone()]
    }

    async fn install(
        &self,
        request: &InstallRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError> {
        let dir = self.envs.provider_dir(EnvironmentKind::Rust, &request.id)?;
        let spec = LaunchSpec::new(self.envs.toolchain().cargo.clone(), cargo_args(&dir, request));
        run_package_manager(&self.envs, &request.id, &spec, reporter).await?;

        Ok(self
            .envs
            .resolve_launch(
                EnvironmentKind::Rust,
                &request.id,
                &binary_name(request),
                request.passthrough_args.clone(),
            )?
            .with_env(request.env.clone()))
    }
}

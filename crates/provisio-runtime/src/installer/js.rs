//! npm-based installs.

use std::sync::Arc;

use async_trait::async_trait;
use provisio_core::{
    EnvironmentKind, InstallEnvironment, InstallStatus, InstallationProgress, ProgressReporter,
};

use super::error::InstallError;
use super::runner::run_package_manager;
use super::{EcosystemInstaller, InstallRequest};
use crate::environment::EnvironmentManager;
use crate::process::LaunchSpec;

/// Installs an npm package into the provider's own prefix and launches it
/// through `npx --prefix`. Local scripts (`node ./server.js`) skip npm and
/// run under `node`.
#[derive(Debug)]
pub struct JsInstaller {
    envs: Arc<EnvironmentManager>,
}

impl JsInstaller {
    pub const fn new(envs: Arc<EnvironmentManager>) -> Self {
        Self { envs }
    }
}

#[async_trait]
impl EcosystemInstaller for JsInstaller {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Js
    }

    fn required_tools(&self) -> Vec<String> {
        let toolchain = self.envs.toolchain();
        vec![toolchain.npm.clone(), toolchain.npx.clone()]
    }

    fn tools_for(&self, request: &InstallRequest) -> Vec<String> {
        if request.local_entry {
            vec![self.envs.toolchain().node.clone()]
        } else {
            self.required_tools()
        }
    }

    async fn install(
        &self,
        request: &InstallRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError> {
        if request.local_entry {
            let env = self.envs.resolve_local_entry(
                &request.id,
                &request.package,
                request.passthrough_args.clone(),
            )?;
            reporter.report(&InstallationProgress::new(
                InstallStatus::Installing,
                "Using local entry point",
                90,
            ));
            return Ok(env.with_env(request.env.clone()));
        }

        let dir = self.envs.provider_dir(EnvironmentKind::Js, &request.id)?;
        let package = &request.package;

        let spec = LaunchSpec::new(
            self.envs.toolchain().npm.clone(),
            [
                "install".to_string(),
                "--prefix".to_string(),
                dir.display().to_string(),
                "--no-audit".to_string(),
                "--no-fund".to_string(),
                package.clone(),
            ],
        );
        run_package_manager(&self.envs, &request.id, &spec, reporter).await?;

        Ok(self
            .envs
            .resolve_launch(
                EnvironmentKind::Js,
                &request.id,
                package,
                request.passthrough_args.clone(),
            )?
            .with_env(request.env.clone()))
    }
}

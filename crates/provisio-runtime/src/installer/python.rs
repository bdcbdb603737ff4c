//! pip installs into a per-provider virtual environment.

use std::sync::Arc;

use async_trait::async_trait;
use provisio_core::{EnvironmentKind, InstallEnvironment, InstallStatus, InstallationProgress, ProgressReporter};

use super::error::InstallError;
use super::runner::run_package_manager;
use super::{EcosystemInstaller, InstallRequest};
use crate::environment::{EnvironmentManager, venv_python};
use crate::process::LaunchSpec;

#[derive(Debug)]
pub struct PythonInstaller {
    envs: Arc<EnvironmentManager>,
}

impl PythonInstaller {
    pub const fn new(envs: Arc<EnvironmentManager>) -> Self {
        Self { envs }
    }
}

#[async_trait]
impl EcosystemInstaller for PythonInstaller {
    fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Python
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.envs.toolchain().python.clone()]
    }

    async fn install(
        &self,
        request: &InstallRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError> {
        reporter.report(&InstallationProgress::new(
            InstallStatus::Downloading,
            "Creating virtual environment",
            5,
        ));
        let venv = self.envs.create_isolated_environment(&request.id).await?;

        let target = &request.package;
        let spec = LaunchSpec::new(
            venv_python(&venv).display().to_string(),
            [
                "-m".to_string(),
                "pip".to_string(),
                "install".to_string(),
                "--disable-pip-version-check".to_string(),
                target.clone(),
            ],
        );
        run_package_manager(&self.envs, &request.id, &spec, reporter).await?;

        Ok(self
            .envs
            .resolve_launch(
                EnvironmentKind::Python,
                &request.id,
                target,
                request.passthrough_args.clone(),
            )?
            .with_env(request.env.clone()))
    }
}

//! Ecosystem installers.
//!
//! One implementation per ecosystem, chosen through [`installer_for`]. Each
//! installer runs exactly one package-manager subprocess (plus venv creation
//! for Python; none for a local `node` script) and returns the resolved
//! [`InstallEnvironment`].

mod error;
mod js;
mod progress;
mod python;
mod runner;
mod rust;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use provisio_core::{
    EcosystemClassification, EnvironmentKind, InstallEnvironment, LaunchConfig, ProgressReporter,
};

use crate::environment::EnvironmentManager;

pub use error::InstallError;
pub use js::JsInstaller;
pub use progress::ProgressEstimator;
pub use python::PythonInstaller;
pub use rust::RustInstaller;

/// What to install and how the result should be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub id: String,
    pub package: String,
    pub repository_url: Option<String>,
    /// Launch arguments following the package token, forwarded to the provider.
    pub passthrough_args: Vec<String>,
    pub env: Option<BTreeMap<String, String>>,
    /// `package` is a script on disk, launched directly by the interpreter.
    pub local_entry: bool,
}

impl InstallRequest {
    pub fn new(
        id: impl Into<String>,
        classification: &EcosystemClassification,
        config: &LaunchConfig,
    ) -> Self {
        Self {
            id: id.into(),
            package: classification.package_name.clone(),
            repository_url: classification.repository_url.clone(),
            passthrough_args: config.args_after(&classification.package_name),
            env: config.env.clone(),
            local_entry: classification.local_entry,
        }
    }
}

/// Installs providers from one package ecosystem.
#[async_trait]
pub trait EcosystemInstaller: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> EnvironmentKind;

    /// Tool commands that must be present before installing.
    fn required_tools(&self) -> Vec<String>;

    /// Tools this particular request needs. Defaults to [`Self::required_tools`].
    fn tools_for(&self, _request: &InstallRequest) -> Vec<String> {
        self.required_tools()
    }

    /// Run the install and return how to relaunch the provider.
    ///
    /// Progress percentages never decrease. The terminal status is left to
    /// the caller, which validates the result first.
    async fn install(
        &self,
        request: &InstallRequest,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError>;
}

/// The installer for an ecosystem.
pub fn installer_for(
    kind: EnvironmentKind,
    envs: Arc<EnvironmentManager>,
) -> Box<dyn EcosystemInstaller> {
    match kind {
        EnvironmentKind::Js => Box::new(JsInstaller::new(envs)),
        EnvironmentKind::Python => Box::new(PythonInstaller::new(envs)),
        EnvironmentKind::Rust => Box::new(RustInstaller::new(envs)),
    }
}

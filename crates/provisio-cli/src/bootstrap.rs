//! CLI bootstrap, the composition root.
//!
//! The only place concrete adapters are wired together: the JSON registry,
//! the tokio process launcher, the `PATH` probe and the provider service.
//! Handlers receive the composed [`CliContext`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use provisio_core::{InstallationRepository, ProvisioConfig, data_root};
use provisio_mcp::ProviderService;
use provisio_runtime::{PathProbe, ProcessLauncher, SystemProbe, TokioLauncher};
use tracing::debug;

use crate::error::CliError;
use crate::store::JsonFileRepository;

const CONFIG_FILE: &str = "config.json";
const REGISTRY_FILE: &str = "providers.json";

/// Where the CLI keeps its data and configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Overrides the platform data root.
    pub data_dir: Option<PathBuf>,
    /// Explicit config file. Must exist when given.
    pub config_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn data_root(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_root()?),
        }
    }

    /// Load the engine configuration.
    ///
    /// An explicit file must exist; the default `<data_root>/config.json` is
    /// optional. The install root defaults to `<data_root>/providers`.
    pub fn load_engine_config(&self, data_root: &Path) -> Result<ProvisioConfig, CliError> {
        let file = match &self.config_file {
            Some(path) => Some(path.clone()),
            None => Some(data_root.join(CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let mut config = match file {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                ProvisioConfig::load(&path).map_err(|e| CliError::Config(e.to_string()))?
            }
            None => ProvisioConfig::default(),
        };
        config.validate().map_err(|e| CliError::Config(e.to_string()))?;

        if config.install_root.is_none() {
            config.install_root = Some(data_root.join("providers"));
        }
        Ok(config)
    }
}

/// Fully composed context for command handlers.
pub struct CliContext {
    pub config: ProvisioConfig,
    pub data_root: PathBuf,
    pub service: ProviderService,
    pub repository: Arc<JsonFileRepository>,
    pub probe: Arc<dyn SystemProbe>,
}

impl CliContext {
    pub const fn service(&self) -> &ProviderService {
        &self.service
    }

    pub fn probe(&self) -> &dyn SystemProbe {
        self.probe.as_ref()
    }

    pub fn registry_path(&self) -> &Path {
        self.repository.path()
    }
}

/// Compose the CLI context.
pub fn bootstrap(cli: &CliConfig) -> Result<CliContext> {
    let data_root = cli.data_root()?;
    let config = cli.load_engine_config(&data_root)?;

    let repository = Arc::new(
        JsonFileRepository::open(data_root.join(REGISTRY_FILE))
            .context("Failed to open the provider registry")?,
    );
    let launcher: Arc<dyn ProcessLauncher> = Arc::new(TokioLauncher);
    let probe: Arc<dyn SystemProbe> = Arc::new(PathProbe);
    let repo: Arc<dyn InstallationRepository> = repository.clone();

    let service = ProviderService::from_config(&config, launcher, probe.clone(), repo)
        .context("Failed to set up the provider service")?;

    debug!(data_root = %data_root.display(), "cli context ready");
    Ok(CliContext {
        config,
        data_root,
        service,
        repository,
        probe,
    })
}

//! `ProviderService`: the facade adapters call.
//!
//! Resolves providers through the installation repository and wires the
//! orchestrator, validator and executor together.

use std::sync::Arc;

use provisio_core::{
    EcosystemClassification, EnvironmentKind, ExecutionResult, FailureKind, InstallEnvironment,
    InstallStatus, InstallationProgress, InstallationRepository, InstalledProvider, LaunchConfig,
    ProgressReporter, ProvisioConfig, RepositoryError, ToolDescriptor, ValidationResult, classify,
};
use provisio_runtime::{
    CleanupReport, EnvironmentError, EnvironmentManager, InstallError, ProcessLauncher,
    SystemProbe,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::executor::ToolExecutor;
use crate::orchestrator::InstallOrchestrator;
use crate::validator::ProtocolValidator;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Provider '{0}' is not installed")]
    NotInstalled(String),

    #[error("Provider '{0}' has no install environment")]
    NoEnvironment(String),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => Self::NotInstalled(id),
            other => Self::Repository(other),
        }
    }
}

/// Environment plus the validation that followed the install.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub environment: InstallEnvironment,
    pub validation: ValidationResult,
}

pub struct ProviderService {
    envs: Arc<EnvironmentManager>,
    repository: Arc<dyn InstallationRepository>,
    orchestrator: InstallOrchestrator,
    validator: ProtocolValidator,
    executor: ToolExecutor,
}

impl ProviderService {
    pub fn new(
        config: &ProvisioConfig,
        envs: Arc<EnvironmentManager>,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn SystemProbe>,
        repository: Arc<dyn InstallationRepository>,
    ) -> Self {
        Self {
            orchestrator: InstallOrchestrator::new(envs.clone(), probe, repository.clone()),
            validator: ProtocolValidator::new(launcher.clone(), config.validation.clone()),
            executor: ToolExecutor::new(launcher, config.execution.clone()),
            envs,
            repository,
        }
    }

    /// Build the environment manager from `config` as well.
    pub fn from_config(
        config: &ProvisioConfig,
        launcher: Arc<dyn ProcessLauncher>,
        probe: Arc<dyn SystemProbe>,
        repository: Arc<dyn InstallationRepository>,
    ) -> Result<Self, ServiceError> {
        let envs = Arc::new(EnvironmentManager::from_config(config, launcher.clone())?);
        Ok(Self::new(config, envs, launcher, probe, repository))
    }

    pub const fn environments(&self) -> &Arc<EnvironmentManager> {
        &self.envs
    }

    pub const fn orchestrator(&self) -> &InstallOrchestrator {
        &self.orchestrator
    }

    pub const fn validator(&self) -> &ProtocolValidator {
        &self.validator
    }

    pub const fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn classify(&self, config: &LaunchConfig) -> EcosystemClassification {
        classify(config)
    }

    /// Install without protocol validation. The record ends `completed`
    /// with an empty tool catalog.
    pub async fn install(
        &self,
        id: &str,
        config: &LaunchConfig,
        ecosystem: Option<EnvironmentKind>,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, ServiceError> {
        let env = self.orchestrator.install(id, config, ecosystem, reporter).await?;
        self.set_status(id, InstallStatus::Completed, "Installed (protocol not validated)")
            .await;
        reporter.report(&InstallationProgress::new(
            InstallStatus::Completed,
            "Installed",
            100,
        ));
        Ok(env)
    }

    /// Install, then validate and store the tool catalog.
    ///
    /// A failed validation is not an `Err`: the record is marked `failed`
    /// and the outcome carries the validation error.
    pub async fn install_and_validate(
        &self,
        id: &str,
        config: &LaunchConfig,
        ecosystem: Option<EnvironmentKind>,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallOutcome, ServiceError> {
        let environment = self.orchestrator.install(id, config, ecosystem, reporter).await?;

        reporter.report(&InstallationProgress::new(
            InstallStatus::Validating,
            "Validating provider protocol",
            95,
        ));
        self.set_status(id, InstallStatus::Validating, "Validating provider protocol")
            .await;

        let validation = self.validator.validate_with_fallback(&environment, config).await;
        self.record_validation(id, &validation).await;

        let (status, message) = if validation.success {
            (InstallStatus::Completed, completion_message(&validation))
        } else {
            (
                InstallStatus::Failed,
                validation
                    .error
                    .clone()
                    .unwrap_or_else(|| "Validation failed".to_string()),
            )
        };
        reporter.report(&InstallationProgress::new(
            status,
            message,
            if validation.success { 100 } else { 95 },
        ));

        Ok(InstallOutcome {
            environment,
            validation,
        })
    }

    /// Validate an installed provider again and refresh its catalog.
    pub async fn revalidate(&self, id: &str) -> Result<ValidationResult, ServiceError> {
        let record = self.repository.get_installed_record(id).await?;
        let env = environment_of(&record)?;

        let validation = match self.envs.validate(env) {
            Ok(()) => self.validator.validate_with_fallback(env, &record.config).await,
            Err(e) => ValidationResult::failed(FailureKind::Spawn, e.to_string()),
        };
        self.record_validation(id, &validation).await;
        Ok(validation)
    }

    /// Run one tool call on a fresh provider process.
    ///
    /// A failed call leaves the stored catalog untouched.
    pub async fn execute_tool(
        &self,
        id: &str,
        tool_name: &str,
        args: &Value,
    ) -> Result<ExecutionResult, ServiceError> {
        let record = self.repository.get_installed_record(id).await?;
        let env = environment_of(&record)?;

        if let Err(e) = self.envs.validate(env) {
            return Ok(ExecutionResult::failed(
                id,
                tool_name,
                FailureKind::Spawn,
                e.to_string(),
                0,
            ));
        }

        Ok(self
            .executor
            .execute(id, env, &record.config, &record.tools, tool_name, args)
            .await)
    }

    /// Remove the record, then the provider's directories.
    ///
    /// Directory cleanup is best effort; its failures are in the reports.
    pub async fn uninstall(&self, id: &str) -> Result<Vec<CleanupReport>, ServiceError> {
        let record = self.repository.get_installed_record(id).await?;
        self.repository.remove_record(id).await?;

        let mut reports = Vec::new();
        if let Some(env) = &record.environment {
            reports.push(self.envs.cleanup(env).await);
        }
        for report in self.envs.cleanup_provider(id).await {
            if !reports.iter().any(|r: &CleanupReport| r.path == report.path) {
                reports.push(report);
            }
        }

        for report in reports.iter().filter(|r| !r.is_ok()) {
            warn!(provider_id = %id, path = %report.path.display(), error = ?report.error, "cleanup incomplete");
        }
        info!(provider_id = %id, "provider uninstalled");
        Ok(reports)
    }

    pub async fn list_tools(&self, id: &str) -> Result<Vec<ToolDescriptor>, ServiceError> {
        Ok(self.repository.get_installed_record(id).await?.tools)
    }

    pub async fn list(&self) -> Result<Vec<InstalledProvider>, ServiceError> {
        Ok(self.repository.list_records().await?)
    }

    /// Persist a validation outcome. Only a confirmed handshake replaces the
    /// tool catalog; a degraded success keeps the previous one.
    async fn record_validation(&self, id: &str, validation: &ValidationResult) {
        if let Err(e) = self.repository.save_validation_result(id, validation).await {
            warn!(provider_id = %id, error = %e, "failed to persist validation result");
        }
        if validation.is_confirmed() {
            if let Err(e) = self.repository.save_tools(id, &validation.tools).await {
                warn!(provider_id = %id, error = %e, "failed to persist tool catalog");
            }
        }

        if validation.success {
            self.set_status(id, InstallStatus::Completed, &completion_message(validation))
                .await;
        } else {
            let message = validation.error.as_deref().unwrap_or("Validation failed");
            self.set_status(id, InstallStatus::Failed, message).await;
        }
    }

    async fn set_status(&self, id: &str, status: InstallStatus, message: &str) {
        if let Err(e) = self.repository.update_status(id, status, message).await {
            warn!(provider_id = %id, status = %status, error = %e, "failed to persist status");
        }
    }
}

fn environment_of(record: &InstalledProvider) -> Result<&InstallEnvironment, ServiceError> {
    record
        .environment
        .as_ref()
        .ok_or_else(|| ServiceError::NoEnvironment(record.id.clone()))
}

fn completion_message(validation: &ValidationResult) -> String {
    if validation.is_confirmed() {
        format!("Ready with {} tool(s)", validation.tools.len())
    } else {
        "Started, but the protocol could not be confirmed".to_string()
    }
}

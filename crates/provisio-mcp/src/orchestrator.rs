//! Installation orchestrator: classify, choose an ecosystem, check the
//! toolchain, run the installer, persist the outcome.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use provisio_core::{
    Ecosystem, EcosystemClassification, EnvironmentKind, InstallEnvironment, InstallStatus,
    InstallationProgress, InstallationRepository, LaunchConfig, ProgressReporter, classify,
};
use provisio_runtime::{EcosystemInstaller, EnvironmentManager, InstallError, InstallRequest, SystemProbe, installer_for};
use tracing::{error, info, warn};

/// Releases the provider id from the in-flight set when dropped.
struct InstallGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InstallGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<String>>, id: &str) -> Result<Self, InstallError> {
        let mut ids = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.to_string()) {
            return Err(InstallError::AlreadyInstalling(id.to_string()));
        }
        Ok(Self {
            in_flight,
            id: id.to_string(),
        })
    }
}

impl Drop for InstallGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Forwards progress to the caller while keeping the logs and the highest
/// percentage seen, so the closing event never goes backwards.
struct Recorder<'a> {
    inner: &'a dyn ProgressReporter,
    state: Mutex<RecorderState>,
}

#[derive(Default)]
struct RecorderState {
    logs: Vec<String>,
    percentage: u8,
}

impl<'a> Recorder<'a> {
    fn new(inner: &'a dyn ProgressReporter) -> Self {
        Self {
            inner,
            state: Mutex::new(RecorderState::default()),
        }
    }

    fn percentage(&self) -> u8 {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).percentage
    }

    fn take_logs(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner).logs)
    }
}

impl ProgressReporter for Recorder<'_> {
    fn report(&self, progress: &InstallationProgress) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.percentage = state.percentage.max(progress.percentage);
            if let Some(lines) = &progress.logs {
                state.logs.extend(lines.iter().cloned());
            }
        }
        self.inner.report(progress);
    }
}

/// Drives installs of providers and records their progress.
///
/// Installs of different ids run independently; a second install of an id
/// that is already being installed is rejected.
pub struct InstallOrchestrator {
    envs: Arc<EnvironmentManager>,
    probe: Arc<dyn SystemProbe>,
    repository: Arc<dyn InstallationRepository>,
    in_flight: Mutex<HashSet<String>>,
}

impl InstallOrchestrator {
    pub fn new(
        envs: Arc<EnvironmentManager>,
        probe: Arc<dyn SystemProbe>,
        repository: Arc<dyn InstallationRepository>,
    ) -> Self {
        Self {
            envs,
            probe,
            repository,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Whether an install of `id` is running right now.
    pub fn is_installing(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Pick the ecosystem: `explicit`, else the classification, else the
    /// first of JS, Python, Rust whose tools are all present.
    pub fn select_ecosystem(
        &self,
        classification: &EcosystemClassification,
        explicit: Option<EnvironmentKind>,
    ) -> Result<EnvironmentKind, InstallError> {
        if let Some(kind) = explicit.or_else(|| classification.ecosystem.environment_kind()) {
            return Ok(kind);
        }

        Ecosystem::PREFERENCE
            .into_iter()
            .find(|&kind| {
                installer_for(kind, self.envs.clone())
                    .required_tools()
                    .iter()
                    .all(|tool| self.probe.find(tool).is_some())
            })
            .ok_or(InstallError::NoEcosystemAvailable)
    }

    /// Install a provider and return how to launch it.
    ///
    /// On success the environment is saved and the status left at
    /// `installing`; the caller decides whether to validate before marking
    /// it completed. On failure the status is set to `failed` and a final
    /// `failed` progress event is emitted.
    pub async fn install(
        &self,
        id: &str,
        config: &LaunchConfig,
        explicit: Option<EnvironmentKind>,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError> {
        let _guard = InstallGuard::acquire(&self.in_flight, id)?;
        let recorder = Recorder::new(reporter);

        self.persist_start(id, config).await;
        recorder.report(&InstallationProgress::new(
            InstallStatus::CheckingDependencies,
            "Checking dependencies",
            0,
        ));

        let result = self.run(id, config, explicit, &recorder).await;

        let logs = recorder.take_logs();
        if !logs.is_empty() {
            if let Err(e) = self.repository.append_logs(id, &logs).await {
                warn!(provider_id = %id, error = %e, "failed to persist install logs");
            }
        }

        match result {
            Ok(env) => {
                info!(provider_id = %id, ecosystem = %env.kind, executable = %env.executable, "provider installed");
                if let Err(e) = self.repository.save_environment(id, &env).await {
                    warn!(provider_id = %id, error = %e, "failed to persist install environment");
                }
                self.persist_status(id, InstallStatus::Installing, "Package installed").await;
                Ok(env)
            }
            Err(e) => {
                error!(provider_id = %id, error = %e, retryable = e.is_retryable(), "install failed");
                let message = e.to_string();
                self.persist_status(id, InstallStatus::Failed, &message).await;
                recorder.report(&InstallationProgress::new(
                    InstallStatus::Failed,
                    message,
                    recorder.percentage(),
                ));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        id: &str,
        config: &LaunchConfig,
        explicit: Option<EnvironmentKind>,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallEnvironment, InstallError> {
        let classification = classify(config);
        let kind = self.select_ecosystem(&classification, explicit)?;
        let installer = installer_for(kind, self.envs.clone());
        let request = InstallRequest::new(id, &classification, config);
        self.check_dependencies(installer.as_ref(), &request)?;

        info!(
            provider_id = %id,
            ecosystem = %kind,
            package = %classification.package_name,
            "installing provider"
        );
        let env = installer.install(&request, reporter).await?;

        self.envs.validate(&env)?;
        Ok(env)
    }

    /// Fails with the first missing tool and its install hint.
    fn check_dependencies(
        &self,
        installer: &dyn EcosystemInstaller,
        request: &InstallRequest,
    ) -> Result<(), InstallError> {
        for tool in installer.tools_for(request) {
            self.probe.require(&tool)?;
        }
        Ok(())
    }

    async fn persist_start(&self, id: &str, config: &LaunchConfig) {
        if let Err(e) = self.repository.save_installation_record(id, config, &[]).await {
            warn!(provider_id = %id, error = %e, "failed to create installation record");
        }
        self.persist_status(id, InstallStatus::CheckingDependencies, "Checking dependencies")
            .await;
    }

    async fn persist_status(&self, id: &str, status: InstallStatus, message: &str) {
        if let Err(e) = self.repository.update_status(id, status, message).await {
            warn!(provider_id = %id, status = %status, error = %e, "failed to persist install status");
        }
    }
}

//! In-memory installation repository for tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::repository::{InstallationRepository, RepositoryError};
use crate::domain::{
    InstallEnvironment, InstallStatus, InstalledProvider, LaunchConfig, ToolDescriptor,
    ValidationResult,
};

/// Keeps records in a map behind an async mutex.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: Mutex<BTreeMap<String, InstalledProvider>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a record, if present.
    pub async fn record(&self, id: &str) -> Option<InstalledProvider> {
        self.records.lock().await.get(id).cloned()
    }

    async fn with_record<F>(&self, id: &str, update: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut InstalledProvider) + Send,
    {
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        update(record);
        record.touch();
        Ok(())
    }
}

#[async_trait]
impl InstallationRepository for InMemoryRepository {
    async fn is_installed(&self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.records.lock().await.contains_key(id))
    }

    async fn get_installed_record(&self, id: &str) -> Result<InstalledProvider, RepositoryError> {
        self.record(id)
            .await
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save_installation_record(
        &self,
        id: &str,
        config: &LaunchConfig,
        tools: &[ToolDescriptor],
    ) -> Result<(), RepositoryError> {
        let record = InstalledProvider::new(id, config.clone(), tools.to_vec());
        self.records.lock().await.insert(id.to_string(), record);
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: InstallStatus,
        message: &str,
    ) -> Result<(), RepositoryError> {
        self.with_record(id, |r| {
            r.status = status;
            r.status_message = message.to_string();
        })
        .await
    }

    async fn append_logs(&self, id: &str, lines: &[String]) -> Result<(), RepositoryError> {
        self.with_record(id, |r| r.logs.extend_from_slice(lines)).await
    }

    async fn save_environment(
        &self,
        id: &str,
        env: &InstallEnvironment,
    ) -> Result<(), RepositoryError> {
        self.with_record(id, |r| r.environment = Some(env.clone()))
            .await
    }

    async fn save_validation_result(
        &self,
        id: &str,
        result: &ValidationResult,
    ) -> Result<(), RepositoryError> {
        self.with_record(id, |r| r.validation = Some(result.clone()))
            .await
    }

    async fn save_tools(&self, id: &str, tools: &[ToolDescriptor]) -> Result<(), RepositoryError> {
        self.with_record(id, |r| r.tools = tools.to_vec()).await
    }

    async fn remove_record(&self, id: &str) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list_records(&self) -> Result<Vec<InstalledProvider>, RepositoryError> {
        Ok(self.records.lock().await.values().cloned().collect())
    }
}

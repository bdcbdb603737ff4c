//! JSON file implementation of the installation repository.
//!
//! The whole registry is kept in memory and rewritten on every change.
//! Writes go to a sibling temp file first and are renamed into place, so a
//! crash never leaves a half-written registry behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use provisio_core::{
    InstallEnvironment, InstallStatus, InstallationRepository, InstalledProvider, LaunchConfig,
    RepositoryError, ToolDescriptor, ValidationResult,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// Install logs kept per provider. Older lines are dropped.
pub const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    providers: BTreeMap<String, InstalledProvider>,
}

#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    records: Mutex<BTreeMap<String, InstalledProvider>>,
}

impl JsonFileRepository {
    /// Load the registry at `path`. A missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let file: RegistryFile = serde_json::from_str(&raw).map_err(|e| {
                    RepositoryError::Internal(format!("{} is corrupt: {e}", path.display()))
                })?;
                file.providers
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(RepositoryError::Internal(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), count = records.len(), "registry loaded");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(
        &self,
        records: &BTreeMap<String, InstalledProvider>,
    ) -> Result<(), RepositoryError> {
        let file = RegistryFile {
            providers: records.clone(),
        };
        let json = serde_json::to_vec_pretty(&file)
            .map_err(|e| RepositoryError::Internal(format!("cannot encode registry: {e}")))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_error)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_error)
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
        self.persist(&records).await
    }
}

fn io_error(e: std::io::Error) -> RepositoryError {
    RepositoryError::Internal(e.to_string())
}

#[async_trait]
impl InstallationRepository for JsonFileRepository {
    async fn is_installed(&self, id: &str) -> Result<bool, RepositoryError> {
        Ok(self.records.lock().await.contains_key(id))
    }

    async fn get_installed_record(&self, id: &str) -> Result<InstalledProvider, RepositoryError> {
        self.records
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn save_installation_record(
        &self,
        id: &str,
        config: &LaunchConfig,
        tools: &[ToolDescriptor],
    ) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().await;
        let mut record = InstalledProvider::new(id, config.clone(), tools.to_vec());
        // Reinstalls keep the original creation time.
        if let Some(previous) = records.get(id) {
            record.created_at = previous.created_at;
        }
        records.insert(id.to_string(), record);
        self.persist(&records).await
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
        self.with_record(id, |r| {
            r.logs.extend_from_slice(lines);
            let excess = r.logs.len().saturating_sub(MAX_LOG_LINES);
            r.logs.drain(..excess);
        })
        .await
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
        let mut records = self.records.lock().await;
        if records.remove(id).is_none() {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        self.persist(&records).await
    }

    async fn list_records(&self) -> Result<Vec<InstalledProvider>, RepositoryError> {
        Ok(self.records.lock().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    fn config() -> LaunchConfig {
        LaunchConfig::new("npx", ["-y", "@modelcontextprotocol/server-filesystem", "/srv"])
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("providers.json");

        let repo = JsonFileRepository::open(&path).unwrap();
        assert_ok!(repo.save_installation_record("fs", &config(), &[]).await);
        assert_ok!(
            repo.update_status("fs", InstallStatus::Completed, "Ready with 2 tool(s)")
                .await
        );
        repo.save_tools("fs", &[ToolDescriptor::new("read"), ToolDescriptor::new("write")])
            .await
            .unwrap();
        drop(repo);

        let reopened = JsonFileRepository::open(&path).unwrap();
        let record = reopened.get_installed_record("fs").await.unwrap();
        assert_eq!(record.status, InstallStatus::Completed);
        assert_eq!(record.status_message, "Ready with 2 tool(s)");
        assert_eq!(record.config, config());
        assert_eq!(record.tools.len(), 2);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_registry() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("providers.json")).unwrap();
        assert!(repo.list_records().await.unwrap().is_empty());
        assert!(!repo.is_installed("fs").await.unwrap());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("providers.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileRepository::open(&path).unwrap_err();
        assert!(err.to_string().contains("corrupt"));
    }

    #[tokio::test]
    async fn test_remove_and_missing_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("providers.json");
        let repo = JsonFileRepository::open(&path).unwrap();
        repo.save_installation_record("fs", &config(), &[]).await.unwrap();

        repo.remove_record("fs").await.unwrap();
        assert!(matches!(
            repo.remove_record("fs").await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.update_status("fs", InstallStatus::Failed, "x").await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(
            JsonFileRepository::open(&path)
                .unwrap()
                .list_records()
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_logs_are_capped() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("providers.json")).unwrap();
        repo.save_installation_record("fs", &config(), &[]).await.unwrap();

        let lines: Vec<String> = (0..MAX_LOG_LINES + 20).map(|i| format!("line {i}")).collect();
        repo.append_logs("fs", &lines).await.unwrap();

        let logs = repo.get_installed_record("fs").await.unwrap().logs;
        assert_eq!(logs.len(), MAX_LOG_LINES);
        assert_eq!(logs.first().map(String::as_str), Some("line 20"));
    }
}

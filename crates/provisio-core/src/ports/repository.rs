//! Installation repository trait and error types.
//!
//! The persistence collaborator is an opaque record store keyed by provider
//! id. Schema ownership lives with the implementation; the engine only reads
//! what it needs to relaunch a provider and writes outcomes.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    InstallEnvironment, InstallStatus, InstalledProvider, LaunchConfig, ToolDescriptor,
    ValidationResult,
};

/// Errors from installation repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No record exists for the provider id.
    #[error("Provider not found: {0}")]
    NotFound(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Repository trait for installed provider records.
///
/// # Design Rules
///
/// - Every method is keyed by provider id
/// - `save_tools()` replaces the catalog wholesale, never merges
/// - `save_installation_record()` creates or resets a record
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait InstallationRepository: Send + Sync {
    /// Whether a record exists for `id`.
    async fn is_installed(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Fetch the full record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists
    /// - `Internal` for storage errors
    async fn get_installed_record(&self, id: &str) -> Result<InstalledProvider, RepositoryError>;

    /// Create or reset the record for `id`.
    async fn save_installation_record(
        &self,
        id: &str,
        config: &LaunchConfig,
        tools: &[ToolDescriptor],
    ) -> Result<(), RepositoryError>;

    /// Record the latest status and message.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists
    async fn update_status(
        &self,
        id: &str,
        status: InstallStatus,
        message: &str,
    ) -> Result<(), RepositoryError>;

    /// Append install log lines.
    async fn append_logs(&self, id: &str, lines: &[String]) -> Result<(), RepositoryError>;

    async fn save_environment(
        &self,
        id: &str,
        env: &InstallEnvironment,
    ) -> Result<(), RepositoryError>;

    async fn save_validation_result(
        &self,
        id: &str,
        result: &ValidationResult,
    ) -> Result<(), RepositoryError>;

    /// Replace the tool catalog.
    async fn save_tools(&self, id: &str, tools: &[ToolDescriptor]) -> Result<(), RepositoryError>;

    /// Delete the record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists
    async fn remove_record(&self, id: &str) -> Result<(), RepositoryError>;

    /// All records, ordered by id.
    async fn list_records(&self) -> Result<Vec<InstalledProvider>, RepositoryError>;
}

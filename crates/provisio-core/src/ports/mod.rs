//! Port definitions (trait abstractions) for external collaborators.
//!
//! # Design Rules
//!
//! - No storage or process types in any signature
//! - Repository methods are keyed by provider id and CRUD-focused
//! - Progress reporting is synchronous and must not block

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod progress;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryRepository;
pub use progress::{NoopProgress, ProgressReporter};
#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockInstallationRepository;
pub use repository::{InstallationRepository, RepositoryError};

//! Path utilities for provisio data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError`; no interactive I/O
//! - Provider ids are sanitised before they touch the filesystem

mod ensure;
mod error;
mod platform;
mod providers;

pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
pub use error::PathError;
pub use platform::{DATA_DIR_ENV, config_path, data_root, providers_root, registry_path};
pub use providers::{ProviderPaths, sanitize_provider_id};

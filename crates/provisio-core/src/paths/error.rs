//! Errors from data root resolution and directory setup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    /// The platform reports no local data directory and `PROVISIO_DATA_DIR` is unset.
    #[error("No data directory available; set PROVISIO_DATA_DIR")]
    NoDataDir,

    #[error("Expected a directory at {0}")]
    NotADirectory(PathBuf),

    /// Returned under `DirectoryCreationStrategy::Disallow`.
    #[error("Required directory {0} is missing")]
    DirectoryNotFound(PathBuf),

    #[error("Cannot create {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    #[error("Cannot write to {path}: {reason}")]
    NotWritable { path: PathBuf, reason: String },

    /// A provider id that sanitises to nothing.
    #[error("Invalid provider id: {0:?}")]
    InvalidProviderId(String),
}

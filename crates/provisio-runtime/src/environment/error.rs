//! Environment manager errors.

use std::path::PathBuf;

use provisio_core::PathError;
use thiserror::Error;

use crate::process::RunError;

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Failed to create virtual environment at {path}: {reason}")]
    VenvCreation { path: PathBuf, reason: String },

    #[error(transparent)]
    Command(#[from] RunError),

    #[error("Installation directory {0} does not exist")]
    MissingRoot(PathBuf),

    #[error("Entry point {0} does not exist")]
    MissingEntryPoint(PathBuf),

    #[error("Executable `{0}` cannot be resolved")]
    UnresolvableExecutable(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Environment manager: installation directories, Python venvs, launch
//! resolution and best-effort cleanup.

mod error;
mod manager;

pub use error::EnvironmentError;
pub use manager::{CleanupReport, EnvironmentManager, python_module_name, venv_python};

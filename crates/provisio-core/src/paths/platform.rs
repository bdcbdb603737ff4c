//! Data root resolution.

use std::env;
use std::path::PathBuf;

use tracing::debug;

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "PROVISIO_DATA_DIR";

/// Root directory for provisio data (installed providers, registry, config).
///
/// Resolution order:
/// 1. `PROVISIO_DATA_DIR` environment variable
/// 2. System data directory (e.g. `~/.local/share/provisio`)
///
/// Does not create the directory.
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            debug!(path = %path, "data root overridden by {DATA_DIR_ENV}");
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data_dir.join("provisio"))
}

/// Default installation root: `<data_root>/providers`.
pub fn providers_root() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("providers"))
}

/// JSON registry file used by the CLI store.
pub fn registry_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("providers.json"))
}

/// Optional JSON configuration file.
pub fn config_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("config.json"))
}

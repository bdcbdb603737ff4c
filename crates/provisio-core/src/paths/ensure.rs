//! Directory creation and verification.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use super::error::PathError;

/// How to handle a missing directory in [`ensure_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryCreationStrategy {
    /// Create the directory (and parents) if it is missing.
    #[default]
    AutoCreate,
    /// Return an error if the directory is missing.
    Disallow,
}

/// Ensure `path` exists as a writable directory.
///
/// Idempotent: calling it on an existing writable directory does nothing
/// beyond the writability probe.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        match strategy {
            DirectoryCreationStrategy::AutoCreate => {
                fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            }
            DirectoryCreationStrategy::Disallow => {
                return Err(PathError::DirectoryNotFound(path.to_path_buf()));
            }
        }
    }

    verify_writable(path)
}

/// Verify a directory is writable by creating and removing a probe file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let probe = path.join(".provisio_write_test");
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
        .map_err(not_writable)?;
    file.write_all(b"ok").map_err(not_writable)?;
    drop(file);
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_auto_create_is_idempotent() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        ensure_directory(&dir, DirectoryCreationStrategy::AutoCreate).unwrap();
        ensure_directory(&dir, DirectoryCreationStrategy::AutoCreate).unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join(".provisio_write_test").exists());
    }

    #[test]
    fn test_disallow_missing() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("missing");
        assert!(matches!(
            ensure_directory(&dir, DirectoryCreationStrategy::Disallow),
            Err(PathError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_directory(&file, DirectoryCreationStrategy::AutoCreate),
            Err(PathError::NotADirectory(_))
        ));
    }
}

//! Per-ecosystem and per-provider installation directories.

use std::path::{Path, PathBuf};

use super::error::PathError;
use crate::domain::EnvironmentKind;

/// Layout of the installation root.
///
/// ```text
/// <root>/
///   npm/<provider>/
///   python/<provider>/venv/
///   rust/<provider>/bin/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPaths {
    root: PathBuf,
}

impl ProviderPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Installation root for one ecosystem.
    pub fn ecosystem_root(&self, kind: EnvironmentKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Directory owned by a single provider.
    pub fn provider_dir(&self, kind: EnvironmentKind, id: &str) -> Result<PathBuf, PathError> {
        Ok(self.ecosystem_root(kind).join(sanitize_provider_id(id)?))
    }
}

/// Map a provider id onto a single safe path component.
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
/// Ids made only of dots or separators are rejected.
pub fn sanitize_provider_id(id: &str) -> Result<String, PathError> {
    let sanitized: String = id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| matches!(c, '.' | '_')) {
        return Err(PathError::InvalidProviderId(id.to_string()));
    }
    Ok(sanitized)
}

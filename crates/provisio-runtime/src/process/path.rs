//! `PATH` construction for child processes.
//!
//! Providers are often wrapper scripts that look up their interpreter on
//! `PATH` (`#!/usr/bin/env node`), so the child gets:
//!
//! 1. extra directories supplied by the caller (e.g. `node_modules/.bin`)
//! 2. the directory containing the executable
//! 3. the current process `PATH`
//!
//! Entries are deduplicated, keeping the first occurrence.

use std::collections::HashSet;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Effective `PATH` for a child built on top of the current process `PATH`.
pub fn build_effective_path(executable: &str, extra_dirs: &[PathBuf]) -> OsString {
    effective_path_from(executable, extra_dirs, env::var_os("PATH").as_deref())
}

/// Same as [`build_effective_path`] with an explicit base `PATH`.
pub fn effective_path_from(
    executable: &str,
    extra_dirs: &[PathBuf],
    base: Option<&OsStr>,
) -> OsString {
    let exe_dir = Path::new(executable)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf);

    let inherited = base.map(env::split_paths).into_iter().flatten();

    let mut seen = HashSet::new();
    let entries: Vec<PathBuf> = extra_dirs
        .iter()
        .cloned()
        .chain(exe_dir)
        .chain(inherited)
        .filter(|entry| !entry.as_os_str().is_empty())
        .filter(|entry| seen.insert(entry.clone()))
        .collect();

    // Entries containing the separator cannot be represented; fall back to
    // the inherited value rather than dropping PATH entirely.
    env::join_paths(entries).unwrap_or_else(|_| base.map(OsStr::to_os_string).unwrap_or_default())
}

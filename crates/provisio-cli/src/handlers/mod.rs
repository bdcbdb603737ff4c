//! Command handlers.
//!
//! Each handler takes the composed [`CliContext`](crate::bootstrap::CliContext)
//! (or nothing, for commands that need no state) and returns `anyhow::Result`.

pub mod check_deps;
pub mod classify;
pub mod exec;
pub mod install;
pub mod list;
pub mod tools;
pub mod uninstall;
pub mod validate;

use provisio_core::ValidationResult;

use crate::presentation::style::{GREEN, RED, RESET, YELLOW};

/// One-line summary of a validation outcome.
pub(crate) fn describe_validation(validation: &ValidationResult) -> String {
    if validation.is_confirmed() {
        format!(
            "{GREEN}✓ Protocol confirmed{RESET}, {} tool(s) available",
            validation.tools.len()
        )
    } else if validation.success {
        format!(
            "{YELLOW}! Provider starts, but the protocol could not be confirmed{RESET}: {}",
            validation.error.as_deref().unwrap_or("no details")
        )
    } else {
        let kind = validation
            .failure
            .map_or_else(String::new, |k| format!(" [{k}]"));
        format!(
            "{RED}✗ Validation failed{kind}{RESET}: {}",
            validation.error.as_deref().unwrap_or("no details")
        )
    }
}

//! Domain types for provider installation, validation and execution.
//!
//! These types carry no I/O and no process handles:
//!
//! - `LaunchConfig` - raw command supplied by a user or catalog
//! - `EcosystemClassification` - derived ecosystem and package name
//! - `InstallEnvironment` - resolved, reusable launch recipe
//! - `InstallationProgress` / `InstallStatus` - install progress events
//! - `ToolDescriptor` - tool catalog entries
//! - `ValidationResult` / `ExecutionResult` - operation outcomes
//! - `InstalledProvider` - persisted record

mod environment;
mod launch;
mod progress;
mod record;
mod results;
mod tool;

pub use environment::InstallEnvironment;
pub use launch::{Ecosystem, EcosystemClassification, EnvironmentKind, LaunchConfig};
pub use progress::{InstallStatus, InstallationProgress};
pub use record::InstalledProvider;
pub use results::{
    ExecutionResult, FailureKind, ProtocolStatus, SimpleValidation, ValidationResult,
};
pub use tool::{InputSchema, PropertySchema, ToolDescriptor, UNNAMED_TOOL};

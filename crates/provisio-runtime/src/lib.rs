#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod environment;
pub mod installer;
pub mod process;
pub mod system;

pub use environment::{CleanupReport, EnvironmentError, EnvironmentManager};
pub use installer::{EcosystemInstaller, InstallError, InstallRequest, installer_for};
pub use process::{LaunchSpec, ProcessLauncher, TerminationPolicy, TokioLauncher};
pub use system::{PathProbe, ProbeError, SystemProbe};

#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod domain;
pub mod params;
pub mod paths;
pub mod ports;
pub mod registry;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    Ecosystem, EcosystemClassification, EnvironmentKind, ExecutionResult, FailureKind,
    InputSchema, InstallEnvironment, InstallStatus, InstallationProgress, InstalledProvider,
    LaunchConfig, PropertySchema, ProtocolStatus, SimpleValidation, ToolDescriptor,
    UNNAMED_TOOL, ValidationResult,
};
pub use params::{ParameterCheck, validate_parameters};
pub use paths::{
    DirectoryCreationStrategy, PathError, ProviderPaths, data_root, ensure_directory,
    providers_root, registry_path,
};
pub use ports::{InstallationRepository, NoopProgress, ProgressReporter, RepositoryError};
pub use registry::classify;
pub use settings::{
    ConfigError, ExecutionConfig, InstallConfig, ProvisioConfig, ToolchainConfig,
    ValidationConfig,
};

#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

mod executor;
mod handshake;
mod orchestrator;
pub mod protocol;
mod service;
mod session;
mod validator;

pub use executor::ToolExecutor;
pub use orchestrator::InstallOrchestrator;
pub use service::{InstallOutcome, ProviderService, ServiceError};
pub use validator::ProtocolValidator;

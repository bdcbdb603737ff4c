#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod progress;
pub mod store;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, EcosystemArg};
pub use error::CliError;
pub use parser::Cli;
pub use progress::CliProgress;
pub use store::JsonFileRepository;

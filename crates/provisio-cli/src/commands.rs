//! Subcommand definitions.

use clap::{Subcommand, ValueEnum};
use provisio_core::EnvironmentKind;

/// Ecosystem override accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EcosystemArg {
    /// npm packages, launched through npx
    Js,
    /// PyPI packages, installed into a per-provider venv
    Python,
    /// Crates built with cargo install
    Rust,
}

impl From<EcosystemArg> for EnvironmentKind {
    fn from(arg: EcosystemArg) -> Self {
        match arg {
            EcosystemArg::Js => Self::Js,
            EcosystemArg::Python => Self::Python,
            EcosystemArg::Rust => Self::Rust,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which package ecosystem a launch command belongs to
    Classify {
        /// Launch command and its arguments, e.g. `npx -y @scope/server`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Install a provider into an isolated environment and validate it
    Install {
        /// Provider id used for the registry and the install directory
        id: String,

        /// Force an ecosystem instead of classifying the command
        #[arg(long, value_enum)]
        ecosystem: Option<EcosystemArg>,

        /// Environment variable for the provider (KEY=VALUE, repeatable)
        #[arg(short = 'e', long = "env", value_parser = parse_env_pair)]
        env: Vec<(String, String)>,

        /// Install only, without the protocol handshake
        #[arg(long)]
        skip_validation: bool,

        /// Launch command and its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Validate an installed provider again and refresh its tool catalog
    Validate {
        /// Provider id
        id: String,
    },

    /// List the tools an installed provider exposes
    Tools {
        /// Provider id
        id: String,

        /// Print the catalog as JSON, including input schemas
        #[arg(long)]
        json: bool,
    },

    /// Call one tool on a fresh provider process
    Exec {
        /// Provider id
        id: String,

        /// Tool name
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Remove a provider and its install directories
    Uninstall {
        /// Provider id
        id: String,
    },

    /// List installed providers
    List,

    /// Check which ecosystem tools are available
    CheckDeps,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

//! Root CLI parser and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Install, validate and run MCP tool providers.
#[derive(Parser)]
#[command(name = "provisio")]
#[command(about = "Install, validate and run MCP tool providers")]
#[command(version)]
pub struct Cli {
    /// Data directory for installed providers and the registry
    #[arg(long = "data-dir", global = true, env = "PROVISIO_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON configuration file (defaults to <data-dir>/config.json when present)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::EcosystemArg;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["provisio", "--verbose", "--data-dir", "/tmp/provisio", "list"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/provisio")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_install_keeps_hyphenated_launch_args() {
        let cli = Cli::parse_from([
            "provisio",
            "install",
            "fs",
            "--ecosystem",
            "js",
            "-e",
            "TOKEN=abc",
            "npx",
            "-y",
            "@modelcontextprotocol/server-filesystem",
            "/srv/data",
        ]);
        let Some(Commands::Install {
            id,
            ecosystem,
            env,
            command,
            skip_validation,
        }) = cli.command
        else {
            panic!("expected install");
        };
        assert_eq!(id, "fs");
        assert_eq!(ecosystem, Some(EcosystemArg::Js));
        assert_eq!(env, vec![("TOKEN".to_string(), "abc".to_string())]);
        assert_eq!(
            command,
            vec!["npx", "-y", "@modelcontextprotocol/server-filesystem", "/srv/data"]
        );
        assert!(!skip_validation);
    }

    #[test]
    fn test_exec_args_default_to_empty_object() {
        let cli = Cli::parse_from(["provisio", "exec", "weather", "get_weather"]);
        let Some(Commands::Exec { args, .. }) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(args, "{}");
    }

    #[test]
    fn test_bad_env_pair_rejected() {
        let result = Cli::try_parse_from(["provisio", "install", "x", "-e", "NOEQUALS", "npx", "pkg"]);
        assert!(result.is_err());
    }
}

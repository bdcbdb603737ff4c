use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use provisio_cli::handlers::{self, install::InstallArgs};
use provisio_cli::{Cli, CliConfig, CliError, Commands, bootstrap};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so `.env` can supply PROVISIO_DATA_DIR.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Classification is pure and needs no data directory.
    if let Commands::Classify { command } = &command {
        return handlers::classify::execute(command);
    }

    let ctx = bootstrap(&CliConfig {
        data_dir: cli.data_dir,
        config_file: cli.config,
    })?;

    match command {
        Commands::Classify { .. } => Ok(()),
        Commands::Install {
            id,
            ecosystem,
            env,
            skip_validation,
            command,
        } => {
            let args = InstallArgs {
                id: &id,
                command: &command,
                env: &env,
                ecosystem: ecosystem.map(Into::into),
                skip_validation,
                verbose: cli.verbose,
            };
            handlers::install::execute(&ctx, args).await
        }
        Commands::Validate { id } => handlers::validate::execute(&ctx, &id).await,
        Commands::Tools { id, json } => handlers::tools::execute(&ctx, &id, json).await,
        Commands::Exec { id, tool, args } => handlers::exec::execute(&ctx, &id, &tool, &args).await,
        Commands::Uninstall { id } => handlers::uninstall::execute(&ctx, &id).await,
        Commands::List => handlers::list::execute(&ctx).await,
        Commands::CheckDeps => handlers::check_deps::execute(&ctx),
    }
}

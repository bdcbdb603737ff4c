//! Install handler.

use anyhow::Result;
use provisio_core::{EnvironmentKind, InstallEnvironment};
use tracing::info;

use super::classify::launch_config;
use super::describe_validation;
use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::style::{BOLD, RESET};
use crate::progress::CliProgress;

pub struct InstallArgs<'a> {
    pub id: &'a str,
    pub command: &'a [String],
    pub env: &'a [(String, String)],
    pub ecosystem: Option<EnvironmentKind>,
    pub skip_validation: bool,
    pub verbose: bool,
}

/// Install a provider, then (unless skipped) validate it.
///
/// A failed validation exits non-zero; the record stays in the registry
/// with status `failed` so `validate` can retry without reinstalling.
pub async fn execute(ctx: &CliContext, args: InstallArgs<'_>) -> Result<()> {
    let config = launch_config(args.command, args.env)?;
    let service = ctx.service();
    let classification = service.classify(&config);
    println!(
        "{BOLD}Installing '{}'{RESET} ({} package {})",
        args.id, classification.ecosystem, classification.package_name
    );

    let progress = CliProgress::new(args.verbose);

    if args.skip_validation {
        let environment = service
            .install(args.id, &config, args.ecosystem, &progress)
            .await
            .map_err(CliError::from)?;
        print_environment(&environment);
        return Ok(());
    }

    let outcome = service
        .install_and_validate(args.id, &config, args.ecosystem, &progress)
        .await
        .map_err(CliError::from)?;
    print_environment(&outcome.environment);
    println!("{}", describe_validation(&outcome.validation));

    if !outcome.validation.success {
        return Err(CliError::Provider(format!(
            "'{}' was installed but failed validation; fix the provider and run `provisio validate {}`",
            args.id, args.id
        ))
        .into());
    }

    info!(provider_id = %args.id, tools = outcome.validation.tools.len(), "install finished");
    Ok(())
}

fn print_environment(env: &InstallEnvironment) {
    println!("Environment: {} at {}", env.kind, env.root_path.display());
    println!("Launch:      {}", env.command_line());
}

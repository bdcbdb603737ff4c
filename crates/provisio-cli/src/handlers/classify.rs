//! Classify handler: shows how a launch command would be installed.

use anyhow::Result;
use provisio_core::{LaunchConfig, classify};

use crate::error::CliError;

pub fn execute(command: &[String]) -> Result<()> {
    let config = launch_config(command, &[])?;
    let classification = classify(&config);

    println!("Command:    {}", command.join(" "));
    println!("Ecosystem:  {}", classification.ecosystem);
    println!("Package:    {}", classification.package_name);
    if let Some(url) = &classification.repository_url {
        println!("Repository: {url}");
    }
    let passthrough = config.args_after(&classification.package_name);
    if !passthrough.is_empty() {
        println!("Arguments:  {}", passthrough.join(" "));
    }
    Ok(())
}

/// Build a launch config from `command` (program first) and `KEY=VALUE` pairs.
pub(crate) fn launch_config(
    command: &[String],
    env: &[(String, String)],
) -> Result<LaunchConfig, CliError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| CliError::Arguments("a launch command is required".to_string()))?;
    Ok(env.iter().fold(
        LaunchConfig::new(program.clone(), args.iter().cloned()),
        |config, (key, value)| config.with_env(key.clone(), value.clone()),
    ))
}

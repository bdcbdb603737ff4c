//! List handler: installed providers as a table.

use anyhow::Result;
use provisio_core::InstalledProvider;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let providers = ctx.service().list().await.map_err(CliError::from)?;

    if providers.is_empty() {
        println!("No providers installed.");
        println!("Use 'provisio install <id> <command> [args...]' to add one.");
        return Ok(());
    }

    println!("Found {} provider(s):\n", providers.len());
    println!(
        "{:<20} {:<10} {:<22} {:<6} {:<20} Command",
        "ID", "Ecosystem", "Status", "Tools", "Updated"
    );
    print_separator(110);

    for provider in &providers {
        println!(
            "{:<20} {:<10} {:<22} {:<6} {:<20} {}",
            truncate_string(&provider.id, 19),
            ecosystem(provider),
            provider.status.to_string(),
            provider.tools.len(),
            provider.updated_at.format("%Y-%m-%d %H:%M:%S"),
            truncate_string(&command_line(provider), 40)
        );
    }
    Ok(())
}

fn ecosystem(provider: &InstalledProvider) -> String {
    provider
        .environment
        .as_ref()
        .map_or_else(|| "--".to_string(), |env| env.kind.to_string())
}

fn command_line(provider: &InstalledProvider) -> String {
    std::iter::once(provider.config.command.as_str())
        .chain(provider.config.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

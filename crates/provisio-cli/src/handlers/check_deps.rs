//! Check-deps handler.
//!
//! Probes the configured toolchain and reports which ecosystems can
//! install providers on this machine.

use anyhow::Result;
use provisio_core::{Ecosystem, EnvironmentKind};
use provisio_runtime::installer_for;
use provisio_runtime::system::{install_hint, tool_version};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::style::{BLUE, BOLD, GREEN, RED, RESET, YELLOW};

struct ToolStatus {
    name: String,
    version: Option<String>,
    found: bool,
}

pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("{BOLD}{BLUE}Checking ecosystem tools...{RESET}\n");
    println!("{BOLD}{:<12} {:<24} {:<12} Notes{RESET}", "ECOSYSTEM", "TOOL", "STATUS");
    println!("{}", "=".repeat(85));

    let mut available = Vec::new();
    for kind in Ecosystem::PREFERENCE {
        let installer = installer_for(kind, ctx.service().environments().clone());
        let statuses: Vec<ToolStatus> = installer
            .required_tools()
            .into_iter()
            .map(|tool| probe(ctx, tool))
            .collect();

        for status in &statuses {
            print_tool(kind, status);
        }
        if statuses.iter().all(|s| s.found) {
            available.push(kind);
        }
    }

    let git = probe(ctx, ctx.config.toolchain.git.clone());
    print_optional("git", &git);

    println!("{}", "=".repeat(85));
    if available.is_empty() {
        println!("{RED}✗ No ecosystem can install providers.{RESET}");
        return Err(CliError::Dependency(
            "Missing required tools for every ecosystem".to_string(),
        )
        .into());
    }

    let names: Vec<String> = available.iter().map(ToString::to_string).collect();
    println!("{GREEN}✓ Ready to install from: {}{RESET}", names.join(", "));
    Ok(())
}

fn probe(ctx: &CliContext, tool: String) -> ToolStatus {
    let found = ctx.probe().find(&tool);
    let version = found
        .as_ref()
        .and_then(|path| tool_version(&path.to_string_lossy()));
    ToolStatus {
        name: tool,
        version,
        found: found.is_some(),
    }
}

fn print_tool(kind: EnvironmentKind, status: &ToolStatus) {
    if status.found {
        println!(
            "{:<12} {:<24} {GREEN}{:<12}{RESET} {}",
            kind.to_string(),
            status.name,
            "found",
            status.version.as_deref().unwrap_or("")
        );
    } else {
        println!(
            "{:<12} {:<24} {RED}{:<12}{RESET} {}",
            kind.to_string(),
            status.name,
            "missing",
            install_hint(&status.name)
        );
    }
}

fn print_optional(label: &str, status: &ToolStatus) {
    let (color, word, note) = if status.found {
        (GREEN, "found", status.version.as_deref().unwrap_or(""))
    } else {
        (YELLOW, "optional", install_hint(&status.name))
    };
    println!(
        "{:<12} {:<24} {color}{word:<12}{RESET} {note}",
        label, status.name
    );
}

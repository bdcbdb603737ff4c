//! Uninstall handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::style::{GREEN, RESET, YELLOW};

pub async fn execute(ctx: &CliContext, id: &str) -> Result<()> {
    let reports = ctx.service().uninstall(id).await.map_err(CliError::from)?;

    for report in &reports {
        match (&report.error, report.removed) {
            (Some(error), _) => println!(
                "{YELLOW}! Could not remove {}{RESET}: {error}",
                report.path.display()
            ),
            (None, true) => println!("Removed {}", report.path.display()),
            (None, false) => {}
        }
    }
    println!("{GREEN}✓ '{id}' uninstalled{RESET}");
    Ok(())
}

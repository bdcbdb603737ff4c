//! Validate handler: re-runs the handshake for an installed provider.

use anyhow::Result;

use super::describe_validation;
use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, id: &str) -> Result<()> {
    let validation = ctx.service().revalidate(id).await.map_err(CliError::from)?;
    println!("{}", describe_validation(&validation));

    for tool in &validation.tools {
        println!("  - {}", tool.name);
    }

    if validation.success {
        Ok(())
    } else {
        Err(CliError::Provider(format!("validation of '{id}' failed")).into())
    }
}

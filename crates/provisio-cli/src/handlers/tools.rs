//! Tools handler: prints the stored tool catalog.

use anyhow::{Context, Result};
use provisio_core::ToolDescriptor;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

pub async fn execute(ctx: &CliContext, id: &str, json: bool) -> Result<()> {
    let tools = ctx.service().list_tools(id).await.map_err(CliError::from)?;

    if json {
        let out = serde_json::to_string_pretty(&tools).context("Failed to encode tool catalog")?;
        println!("{out}");
        return Ok(());
    }

    if tools.is_empty() {
        println!("'{id}' has no known tools.");
        println!("Run 'provisio validate {id}' to query the provider.");
        return Ok(());
    }

    println!("{:<28} {:<30} Description", "Tool", "Parameters");
    print_separator(100);
    for tool in &tools {
        println!(
            "{:<28} {:<30} {}",
            truncate_string(&tool.name, 27),
            truncate_string(&parameter_summary(tool), 29),
            truncate_string(&tool.description, 40)
        );
    }
    Ok(())
}

/// Parameter names, required ones marked with `*`.
fn parameter_summary(tool: &ToolDescriptor) -> String {
    let schema = &tool.input_schema;
    if schema.properties.is_empty() {
        return "--".to_string();
    }
    schema
        .properties
        .keys()
        .map(|name| {
            if schema.required.contains(name) {
                format!("{name}*")
            } else {
                name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

use anyhow::{anyhow, Result};
use blockwork_schema::{SchemaEntry, SchemaRegistry};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Block type to describe (all types when omitted)
    pub block_type: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

pub fn schema(args: SchemaArgs) -> Result<()> {
    let registry = SchemaRegistry::builtin();

    let entries: Vec<&SchemaEntry> = match &args.block_type {
        Some(name) => vec![registry
            .lookup(name)
            .ok_or_else(|| anyhow!("Unknown block type: {}", name))?],
        None => registry.entries().collect(),
    };

    if args.json {
        let described: Vec<_> = entries.iter().map(|entry| entry.describe()).collect();
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    for entry in entries {
        print_entry(entry)?;
    }
    Ok(())
}

fn print_entry(entry: &SchemaEntry) -> Result<()> {
    println!("{}", entry.type_name().bright_white().bold());

    if !entry.capabilities.is_empty() {
        let capabilities: Vec<String> = entry.capabilities.iter().map(|c| c.to_string()).collect();
        println!("  capabilities: {}", capabilities.join(", ").cyan());
    }
    if let Some(parents) = &entry.allowed_parents {
        let parents: Vec<&str> = parents.iter().map(|k| k.as_str()).collect();
        let parents = if parents.is_empty() {
            "none (root only)".to_string()
        } else {
            parents.join(", ")
        };
        println!("  parents: {}", parents.yellow());
    }
    if !entry.slots.is_empty() {
        let slots: Vec<&str> = entry.slots.iter().map(|s| s.name.as_str()).collect();
        println!("  slots: {}", slots.join(", "));
    }

    let default = serde_json::to_string(&entry.default_value().props)?;
    println!("  default: {}", default.dimmed());
    println!();
    Ok(())
}

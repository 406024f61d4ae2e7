mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{init, render, schema, validate, InitArgs, RenderArgs, SchemaArgs, ValidateArgs};
use config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Blockwork CLI - render, validate and inspect block documents
#[derive(Parser, Debug)]
#[command(name = "blockwork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and an empty document
    Init(InitArgs),

    /// Render a document to HTML
    Render(RenderArgs),

    /// Check documents against the block schemas
    Validate(ValidateArgs),

    /// List block types with their capabilities and defaults
    Schema(SchemaArgs),
}

/// `RUST_LOG` wins, then the config file's `logLevel`, then `warn`
fn init_logging(cwd: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = Config::load(cwd)
            .ok()
            .and_then(|config| config.log_level)
            .unwrap_or_else(|| "warn".to_string());
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    init_logging(&cwd);

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Validate(args) => validate(args, &cwd),
        Command::Schema(args) => schema(args),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

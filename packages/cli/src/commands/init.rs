use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use blockwork_model::Document;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

pub const DEFAULT_DOCUMENT_NAME: &str = "page.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(default_value = ".")]
    pub dir: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let dir = cwd.join(&args.dir);
    let config_path = dir.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Blockwork project...".bright_blue().bold());

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        println!("  {} Created {}/", "✓".green(), args.dir);
    }

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let document_path = dir.join(DEFAULT_DOCUMENT_NAME);
    if !document_path.exists() || args.force {
        Document::empty().save(&document_path)?;
        println!("  {} Created {}", "✓".green(), DEFAULT_DOCUMENT_NAME);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Add blocks to {}", DEFAULT_DOCUMENT_NAME);
    println!("  2. Run: blockwork validate");
    println!("  3. Run: blockwork render {} --out page.html", DEFAULT_DOCUMENT_NAME);

    Ok(())
}

use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::{anyhow, Result};
use blockwork_model::{check_unique_ids, BlockNode, ROOT_TYPE};
use blockwork_schema::SchemaRegistry;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Document or directory of documents (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub fn validate(args: ValidateArgs, cwd: &Path) -> Result<()> {
    let path = cwd.join(&args.path);
    if !path.exists() {
        return Err(anyhow!("Path does not exist: {}", path.display()));
    }

    let registry = SchemaRegistry::builtin();
    let files = if path.is_file() {
        vec![path.clone()]
    } else {
        find_documents(&path)
    };

    if files.is_empty() {
        println!("{}", "⚠️  No documents found".yellow());
        return Ok(());
    }

    let mut failed = 0;
    for file in &files {
        let relative = file.strip_prefix(&path).unwrap_or(file);
        let label = if relative.as_os_str().is_empty() { file.as_path() } else { relative };

        let problems = fs::read_to_string(file)
            .map_err(anyhow::Error::from)
            .and_then(|source| check_document(&source, &registry));

        match problems {
            Ok(problems) if problems.is_empty() => {
                println!("  {} {}", "✓".green(), label.display());
            }
            Ok(problems) => {
                failed += 1;
                println!("  {} {}", "✗".red(), label.display());
                for problem in problems {
                    println!("      {}", problem.red());
                }
            }
            Err(e) => {
                failed += 1;
                println!("  {} {} - {}", "✗".red(), label.display(), e.to_string().red());
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} documents valid", "✅".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!("{} of {} documents have problems", failed, files.len()))
    }
}

fn find_documents(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .filter(|path| path.file_name().and_then(|s| s.to_str()) != Some(DEFAULT_CONFIG_NAME))
        .collect()
}

/// Every problem found in one document, as display lines
///
/// Reads strictly: unlike `Document` loading, nothing is repaired.
pub fn check_document(source: &str, registry: &SchemaRegistry) -> Result<Vec<String>> {
    let root: BlockNode = serde_json::from_str(source)?;
    let mut problems = Vec::new();

    if root.block_type != ROOT_TYPE {
        problems.push(format!("Root block is {} instead of {}", root.block_type, ROOT_TYPE));
    }
    if let Err(e) = check_unique_ids(&root) {
        problems.push(e.to_string());
    }
    for issue in registry.validate_tree(&root) {
        for error in issue.errors.iter() {
            problems.push(format!(
                "{} ({}) {}: {}",
                issue.block_id,
                issue.block_type,
                error.path,
                error.message()
            ));
        }
    }

    Ok(problems)
}

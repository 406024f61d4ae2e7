use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use blockwork_editor::EditSession;
use blockwork_expression::Args as RuntimeArgs;
use blockwork_model::Document;
use blockwork_renderer::{to_html_with, HtmlOptions, RenderOutcome, Renderer};
use blockwork_schema::SchemaRegistry;
use blockwork_style::Breakpoint;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Document to render
    pub document: PathBuf,

    /// JSON file with the runtime arguments bindings read from
    #[arg(short, long)]
    pub args: Option<PathBuf>,

    /// Render with editor affordances
    #[arg(long)]
    pub editor: bool,

    /// Breakpoint for inline styles (sm, md, lg, xl); overrides config
    #[arg(short, long)]
    pub breakpoint: Option<String>,

    /// Print the virtual DOM as JSON instead of HTML
    #[arg(long)]
    pub json: bool,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = SchemaRegistry::builtin();

    let doc_path = cwd.join(&args.document);
    let document = Document::load(&doc_path)
        .with_context(|| format!("Cannot read document {}", doc_path.display()))?;
    let runtime = load_runtime_args(cwd, args.args.as_deref())?;

    let mut options = config.render_options();
    if let Some(name) = &args.breakpoint {
        let breakpoint =
            Breakpoint::parse(name).ok_or_else(|| anyhow!("Unknown breakpoint: {}. Use: sm, md, lg or xl", name))?;
        options.breakpoint = Some(breakpoint);
    }

    let title = document
        .root
        .prop_str("title")
        .filter(|title| !title.is_empty())
        .unwrap_or("Blockwork page")
        .to_string();

    let outcome = if args.editor {
        let mut session_options = config.session_options();
        session_options.render = options;
        EditSession::with_options(&registry, document, session_options).render(&runtime)
    } else {
        Renderer::new(&registry)
            .with_options(options)
            .render_document(&document, &runtime)
    };

    let page = match outcome {
        RenderOutcome::Page(page) => page,
        RenderOutcome::Redirect { url, permanent } => {
            let kind = if permanent { "Permanent redirect" } else { "Redirect" };
            println!("{} {} to {}", "↪".yellow(), kind, url.bright_white());
            return Ok(());
        }
    };

    let output = if args.json {
        serde_json::to_string_pretty(&page)?
    } else {
        let html_options = HtmlOptions {
            pretty: config.pretty,
            ..HtmlOptions::page(title)
        };
        to_html_with(&page, &html_options)
    };

    match &args.out {
        Some(out) => {
            let out_path = cwd.join(out);
            fs::write(&out_path, output)?;
            println!("  {} {} → {}", "✓".green(), args.document.display(), out_path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn load_runtime_args(cwd: &Path, path: Option<&Path>) -> Result<RuntimeArgs> {
    let Some(path) = path else {
        return Ok(RuntimeArgs::default());
    };
    let path = cwd.join(path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read arguments {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Arguments file {} is not JSON", path.display()))?;
    Ok(RuntimeArgs::from_value(value))
}

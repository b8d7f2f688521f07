//! folio CLI - compliance document toolkit.
//!
//! Provides commands for:
//! - `render`: Markdown to sanitized HTML
//! - `to-markdown`: HTML back to dialect Markdown
//! - `sanitize`: sanitize an HTML fragment
//! - `export`: stored HTML to a Markdown document with front matter
//! - `import`: Markdown document to JSON `{front_matter, html, headings}`

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, GlobalArgs, ImportArgs, RenderArgs, SanitizeArgs, ToMarkdownArgs};
use output::Output;

/// folio - compliance document toolkit.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render Markdown to sanitized HTML.
    Render(RenderArgs),
    /// Convert HTML to dialect Markdown.
    ToMarkdown(ToMarkdownArgs),
    /// Sanitize an HTML fragment.
    Sanitize(SanitizeArgs),
    /// Export stored HTML as a Markdown document.
    Export(ExportArgs),
    /// Import a Markdown document as JSON.
    Import(ImportArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&cli.global, &output),
        Commands::ToMarkdown(args) => args.execute(&cli.global, &output),
        Commands::Sanitize(args) => args.execute(&cli.global, &output),
        Commands::Export(args) => args.execute(&cli.global, &output),
        Commands::Import(args) => args.execute(&cli.global, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

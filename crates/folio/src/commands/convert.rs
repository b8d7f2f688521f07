//! `folio render`, `folio to-markdown` and `folio sanitize`.

use std::path::PathBuf;

use clap::Args;
use folio_config::CliSettings;
use folio_markdown::{Document, HtmlToMarkdown, render_markdown};

use super::{GlobalArgs, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,
}

impl RenderArgs {
    /// Execute the render command. Front matter is dropped from the output.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or reading the input fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        global.load_config(CliSettings::default())?;
        let document = Document::parse(&read_input(&self.input)?);
        let rendered = render_markdown(&document.body);

        for warning in &rendered.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        output.document(&rendered.html)?;
        Ok(())
    }
}

/// Arguments for the to-markdown command.
#[derive(Args)]
pub(crate) struct ToMarkdownArgs {
    /// HTML file, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,
}

impl ToMarkdownArgs {
    /// Execute the to-markdown command. Masked content is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or reading the input fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        global.load_config(CliSettings::default())?;
        let html = read_input(&self.input)?;
        output.document(&HtmlToMarkdown::new().convert(&html))?;
        Ok(())
    }
}

/// Arguments for the sanitize command.
#[derive(Args)]
pub(crate) struct SanitizeArgs {
    /// HTML file, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Use the restricted comment policy.
    #[arg(long)]
    comment: bool,
}

impl SanitizeArgs {
    /// Execute the sanitize command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or reading the input fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        global.load_config(CliSettings::default())?;
        let html = read_input(&self.input)?;
        let sanitized = if self.comment {
            folio_sanitize::sanitize_comment(html.as_str())
        } else {
            folio_sanitize::sanitize_html(html.as_str())
        };
        output.document(&sanitized)?;
        Ok(())
    }
}

//! `folio export` and `folio import`.

use std::path::PathBuf;

use clap::Args;
use folio_config::CliSettings;
use folio_markdown::{ExportOptions, FrontMatter, export_markdown, import_markdown};

use super::{GlobalArgs, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Stored HTML file, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Keep privacy-masked content instead of its placeholder.
    #[arg(long)]
    reveal_privacy: bool,

    /// Drop table-of-contents markers.
    #[arg(long)]
    no_toc: bool,

    /// Front matter entry, `key=value` (repeatable).
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    meta: Vec<(String, String)>,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or reading the input fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let config = global.load_config(CliSettings {
            reveal_privacy: self.reveal_privacy.then_some(true),
            include_toc: self.no_toc.then_some(false),
            ..CliSettings::default()
        })?;

        let mut front_matter = FrontMatter::new();
        for (key, value) in &self.meta {
            front_matter.insert_raw(key.as_str(), value);
        }

        let options = ExportOptions {
            reveal_privacy: config.export.reveal_privacy,
            include_toc: config.export.include_toc,
            front_matter,
        };
        let html = read_input(&self.input)?;
        output.document(&export_markdown(&html, &options))?;
        Ok(())
    }
}

/// Arguments for the import command.
#[derive(Args)]
pub(crate) struct ImportArgs {
    /// Markdown document, or `-` for stdin.
    #[arg(default_value = "-")]
    input: PathBuf,
}

impl ImportArgs {
    /// Execute the import command, printing JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading the input or JSON
    /// serialization fails.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        global.load_config(CliSettings::default())?;
        let imported = import_markdown(&read_input(&self.input)?);

        for warning in &imported.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        output.document(&serde_json::to_string_pretty(&imported)?)?;
        Ok(())
    }
}

/// Parse a `key=value` front matter argument.
fn parse_meta(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{arg}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_meta() {
        assert_eq!(
            parse_meta("title=Access review").unwrap(),
            ("title".to_owned(), "Access review".to_owned())
        );
        assert_eq!(
            parse_meta("expr=a=b").unwrap(),
            ("expr".to_owned(), "a=b".to_owned())
        );
        assert_eq!(parse_meta("empty=").unwrap(), ("empty".to_owned(), String::new()));
    }

    #[test]
    fn test_parse_meta_rejects_malformed() {
        assert!(parse_meta("title").is_err());
        assert!(parse_meta(" =x").is_err());
    }
}

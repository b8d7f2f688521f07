//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod document;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use folio_config::{CliSettings, Config};

use crate::error::CliError;

pub(crate) use convert::{RenderArgs, SanitizeArgs, ToMarkdownArgs};
pub(crate) use document::{ExportArgs, ImportArgs};

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Sanitizer backend: auto, dom or scan (overrides config).
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Enable verbose output (backend selection, directive warnings).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load configuration and select the process-wide sanitizer backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub(crate) fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.backend.clone_from(&self.backend);
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        folio_sanitize::init(config.backend_preference()?);
        Ok(config)
    }
}

/// Read a whole input file, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

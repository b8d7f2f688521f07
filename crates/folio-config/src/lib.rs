//! Configuration management for folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [sanitizer]
//! backend = "auto"   # auto | dom | scan
//!
//! [export]
//! reveal_privacy = false
//! include_toc = true
//! ```

use std::path::{Path, PathBuf};

use folio_sanitize::{BackendKind, BackendPreference};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override sanitizer backend name.
    pub backend: Option<String>,
    /// Override export privacy reveal flag.
    pub reveal_privacy: Option<bool>,
    /// Override export TOC flag.
    pub include_toc: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sanitizer configuration.
    pub sanitizer: SanitizerConfig,
    /// Export defaults.
    pub export: ExportConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Sanitizer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Backend name: `auto`, `dom` or `scan`.
    pub backend: String,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_owned(),
        }
    }
}

/// Export defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Keep privacy-masked content instead of the placeholder.
    pub reveal_privacy: bool,
    /// Keep table-of-contents markers.
    pub include_toc: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            reveal_privacy: false,
            include_toc: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and validated together with
    /// the file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(backend) = &settings.backend {
            self.sanitizer.backend.clone_from(backend);
        }
        if let Some(reveal_privacy) = settings.reveal_privacy {
            self.export.reveal_privacy = reveal_privacy;
        }
        if let Some(include_toc) = settings.include_toc {
            self.export.include_toc = include_toc;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown backend name, or an
    /// explicit `dom` backend in a build without DOM support.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend_preference().map(|_| ())
    }

    /// Parsed sanitizer backend preference.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Config::validate`].
    pub fn backend_preference(&self) -> Result<BackendPreference, ConfigError> {
        let preference: BackendPreference = self
            .sanitizer
            .backend
            .parse()
            .map_err(|e| ConfigError::Validation(format!("sanitizer.backend: {e}")))?;

        if preference == BackendPreference::Dom && !BackendKind::Dom.is_available() {
            return Err(ConfigError::Validation(
                "sanitizer.backend: dom backend is not available in this build".to_owned(),
            ));
        }
        Ok(preference)
    }
}

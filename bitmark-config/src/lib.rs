//! Shared configuration loader for the bitmark toolchain.
//!
//! `defaults/bitmark.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`BitmarkConfig`].

use bitmark_babel::breakscape::BreakscapeOptions;
use bitmark_babel::text::TextGeneratorOptions;
use bitmark_babel::{TextFormat, TextLocation};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/bitmark.default.toml");

/// Top-level configuration consumed by bitmark applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BitmarkConfig {
    pub breakscape: BreakscapeConfig,
    pub generate: GenerateConfig,
    pub validate: ValidateConfig,
}

/// Defaults for the breakscape and unbreakscape commands.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakscapeConfig {
    pub format: TextFormat,
    pub location: TextLocation,
}

impl From<&BreakscapeConfig> for BreakscapeOptions {
    fn from(config: &BreakscapeConfig) -> Self {
        BreakscapeOptions::new(config.format, config.location)
    }
}

/// Mirrors the knobs exposed by the text generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateConfig {
    pub text_format: TextFormat,
    pub text_location: TextLocation,
    pub plain_text_divider_allowed: bool,
}

impl From<&GenerateConfig> for TextGeneratorOptions {
    fn from(config: &GenerateConfig) -> Self {
        TextGeneratorOptions {
            plain_text_divider_allowed: config.plain_text_divider_allowed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateConfig {
    pub check_common_mistakes: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<BitmarkConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BitmarkConfig, ConfigError> {
    Loader::new().build()
}

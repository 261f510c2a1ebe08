//! Configuration for the command-line front end.
//!
//! Settings come from a YAML file (`--config <path>`, else `btree.yaml` in the working
//! directory when it exists) and are then overridden by command-line flags.
//!
//! ```yaml
//! color: never
//! format: short
//! fields: behaviors/fields.yaml
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use termcolor::ColorChoice;

use crate::errors::BtreeError;
use crate::reflect::FieldManifest;

pub const DEFAULT_CONFIG_FILE: &str = "btree.yaml";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a concrete choice; `Auto` only colors a terminal.
    pub fn resolve(self, is_terminal: bool) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if is_terminal => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rich report with a source snippet.
    #[default]
    Human,
    /// One `file:line:column: severity: message` line per diagnostic.
    Short,
    /// A JSON array of diagnostics.
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub color: ColorMode,
    pub format: OutputFormat,
    /// Field manifest enabling the attribute check.
    pub fields: Option<PathBuf>,
}

impl Config {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load a configuration file. A relative `fields` path is taken relative to the
    /// file's own directory.
    pub fn load(path: &Path) -> Result<Self, BtreeError> {
        let content = std::fs::read_to_string(path).map_err(|source| BtreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content).map_err(|source| BtreeError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if let (Some(fields), Some(dir)) = (config.fields.as_ref(), path.parent()) {
            if fields.is_relative() {
                config.fields = Some(dir.join(fields));
            }
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Use `explicit` if given, else `btree.yaml` under `dir` if present, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, BtreeError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::default())
    }

    pub fn field_manifest(&self) -> Result<Option<FieldManifest>, BtreeError> {
        self.fields
            .as_deref()
            .map(FieldManifest::load)
            .transpose()
    }
}

//! Configuration loading and typed config structures for the batch runner.
//!
//! The canonical configuration lives in `legaltime.yaml` next to the
//! binary's working directory. This module defines strongly-typed structs
//! mirroring the YAML structure and a loader that reads and validates the
//! file. Input and output paths can be overridden by environment variables
//! for scripted reruns.

use std::path::{Path, PathBuf};

use legaltime_boundaries::BoundaryConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Paths of the override table documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverridePaths {
    /// The disable/remap document.
    #[serde(default = "default_place_overrides_path")]
    pub place_overrides: PathBuf,
    /// The name-alias document (also the known-code universe).
    #[serde(default = "default_region_names_path")]
    pub region_names: PathBuf,
}

impl Default for OverridePaths {
    fn default() -> Self {
        Self {
            place_overrides: default_place_overrides_path(),
            region_names: default_region_names_path(),
        }
    }
}

fn default_place_overrides_path() -> PathBuf {
    PathBuf::from("place_overrides.json")
}

fn default_region_names_path() -> PathBuf {
    PathBuf::from("region_names.json")
}

/// Top-level batch runner configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// Reference dataset locations (cache paths and source URLs).
    #[serde(default)]
    pub datasets: BoundaryConfig,

    /// Override table locations.
    #[serde(default)]
    pub overrides: OverridePaths,

    /// Newline-delimited JSON event input.
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Newline-delimited JSON estimate output.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Worker count; 0 means one worker per available core.
    #[serde(default)]
    pub workers: usize,

    /// Events per batch pulled from the shared queue.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            datasets: BoundaryConfig::default(),
            overrides: OverridePaths::default(),
            input_path: default_input_path(),
            output_path: default_output_path(),
            workers: 0,
            batch_size: default_batch_size(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("events.ndjson")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("estimates.ndjson")
}

const fn default_batch_size() -> usize {
    500
}

impl RunnerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override paths for scripted reruns:
    /// - `LEGALTIME_INPUT` overrides `input_path`
    /// - `LEGALTIME_OUTPUT` overrides `output_path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// The worker pool size: the configured count, or one per available
    /// core when the count is 0.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(input) = std::env::var("LEGALTIME_INPUT") {
            self.input_path = PathBuf::from(input);
        }
        if let Ok(output) = std::env::var("LEGALTIME_OUTPUT") {
            self.output_path = PathBuf::from(output);
        }
    }
}

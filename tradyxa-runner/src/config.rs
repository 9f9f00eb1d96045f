//! Pipeline configuration.
//!
//! Wraps the engine knobs with the runner's own sections: where raw bars
//! live, when cached data is too old, where snapshots go and how many
//! instruments a batch processes at once. Every field has a default, so an
//! empty TOML file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradyxa_core::domain::Symbology;
use tradyxa_core::EngineConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Engine(#[from] tradyxa_core::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Raw-data section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory of the OHLCV CSV cache.
    pub raw_dir: PathBuf,
    /// Cached or fetched data whose last bar is older than this is unusable.
    pub max_staleness_days: i64,
    /// Generate synthetic bars when no real data is usable.
    pub synthetic_fallback: bool,
    /// Never call the provider.
    pub offline: bool,
    /// History requested from the provider on a cold cache.
    pub history_days: i64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            max_staleness_days: 5,
            synthetic_fallback: true,
            offline: false,
            history_days: 3_650,
        }
    }
}

/// Snapshot output section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Feature rows kept in `features_head`.
    pub history_rows: usize,
    /// Also write files under the instrument's friendly name.
    pub friendly_copies: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public/data/ticker"),
            history_rows: 500,
            friendly_copies: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_workers: 4 }
    }
}

/// Optional precomputed model outputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predictions: Option<PathBuf>,
}

/// Full runner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub engine: EngineConfig,
    pub data: DataConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub ml: MlConfig,
    pub symbology: Symbology,
}

impl PipelineConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.data.max_staleness_days < 0 {
            return Err(ConfigError::Invalid(
                "data.max_staleness_days must be non-negative".into(),
            ));
        }
        if self.data.history_days <= 0 {
            return Err(ConfigError::Invalid("data.history_days must be positive".into()));
        }
        if self.batch.max_workers == 0 {
            return Err(ConfigError::Invalid("batch.max_workers must be at least 1".into()));
        }
        Ok(())
    }
}

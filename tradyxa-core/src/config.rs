//! Engine configuration: every numeric knob of the feature, slippage, verdict
//! and series stages, loadable from TOML with defaults for anything omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::features::FeatureConfig;
use crate::rng::SeedHierarchy;
use crate::series::SeriesConfig;
use crate::slippage::SlippageConfig;
use crate::verdict::{check_params, VerdictParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Master seed for every random stream.
    pub seed: u64,
    /// VIX-like volatility level reported in metrics and used for scaling.
    pub vix_level: f64,
    pub features: FeatureConfig,
    pub slippage: SlippageConfig,
    pub verdict: VerdictParams,
    pub series: SeriesConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            vix_level: 15.0,
            features: FeatureConfig::default(),
            slippage: SlippageConfig::default(),
            verdict: VerdictParams::default(),
            series: SeriesConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn seeds(&self) -> SeedHierarchy {
        SeedHierarchy::new(self.seed)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.features.window < 2 {
            return invalid("features.window must be at least 2");
        }
        let s = &self.slippage;
        if s.notionals.is_empty() {
            return invalid("slippage.notionals must not be empty");
        }
        if s.notionals.iter().any(|n| !n.is_finite() || *n < 0.0) {
            return invalid("slippage.notionals must be finite and non-negative");
        }
        let (lo, hi) = s.participation_range;
        if !(0.0..=1.0).contains(&lo) || !(lo..=1.0).contains(&hi) {
            return invalid("slippage.participation_range must satisfy 0 <= lo <= hi <= 1");
        }
        if s.noise_scale < 0.0 {
            return invalid("slippage.noise_scale must be non-negative");
        }
        if let Err(e) = check_params(&self.verdict) {
            return Err(ConfigError::Invalid(e.to_string()));
        }
        if !self.vix_level.is_finite() || self.vix_level < 0.0 {
            return invalid("vix_level must be finite and non-negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = EngineConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            seed = 7

            [slippage]
            n_sim = 100

            [verdict]
            w_momentum = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.slippage.n_sim, 100);
        assert_eq!(config.slippage.notionals.len(), 4);
        assert_eq!(config.verdict.w_momentum, 0.5);
        assert_eq!(config.verdict.w_flow, 0.25);
        assert_eq!(config.features.window, 20);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            EngineConfig::from_toml("[features]\nwindow = 1\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("[slippage]\nnotionals = []\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("[slippage]\nparticipation_range = [0.7, 0.2]\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("[verdict]\nvol_scale_min = 3.0\nvol_scale_max = 0.2\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("[verdict]\nmomentum_clip = nan\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("seed = \"abc\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

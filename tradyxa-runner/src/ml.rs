//! Precomputed model outputs.
//!
//! Regime classification and quantile-regression slippage forecasts are
//! produced offline. The runner only reads them from a JSON file mapping a
//! ticker to its latest prediction and threads them into the verdict.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradyxa_core::slippage::SlippageTable;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("failed to read predictions {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed predictions file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Model output for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlPrediction {
    /// Execution regime class, 0 (low) through 3 (severe).
    #[serde(default)]
    pub regime_label: Option<i64>,
    /// Class probabilities.
    #[serde(default)]
    pub regime_prob: Vec<f64>,
    #[serde(default)]
    pub predicted_median: Option<f64>,
    #[serde(default)]
    pub predicted_p90: Option<f64>,
}

impl MlPrediction {
    /// Attach the slippage forecast to the smallest notional of `table`.
    pub fn apply_to(&self, table: &mut SlippageTable) {
        if self.predicted_median.is_none() && self.predicted_p90.is_none() {
            return;
        }
        if let Some(summary) = table.smallest_mut() {
            summary.predicted_median = self.predicted_median.filter(|v| v.is_finite());
            summary.predicted_p90 = self.predicted_p90.filter(|v| v.is_finite());
        }
    }
}

/// Predictions keyed by ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MlPredictions {
    by_ticker: BTreeMap<String, MlPrediction>,
}

impl MlPredictions {
    pub fn load(path: &Path) -> Result<Self, MlError> {
        let text = std::fs::read_to_string(path).map_err(|source| MlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| MlError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn insert(&mut self, ticker: impl Into<String>, prediction: MlPrediction) {
        self.by_ticker.insert(ticker.into(), prediction);
    }

    /// Prediction for the first of `keys` that has one.
    pub fn lookup<'a, I>(&self, keys: I) -> Option<&MlPrediction>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().find_map(|k| self.by_ticker.get(k))
    }

    pub fn len(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_ticker.is_empty()
    }
}

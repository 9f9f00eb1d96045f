//! Per-instrument snapshot document.
//!
//! The snapshot is the JSON object the dashboard reads: provenance, latest
//! metrics with the verdict embedded, the recent feature history keyed by
//! timestamp, and every derived series. Slippage tables are written to their
//! own files and are not part of it.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tradyxa_core::data::DataSource;
use tradyxa_core::features::{FeatureRow, MarketMetrics};
use tradyxa_core::series::DerivedSeries;
use tradyxa_core::verdict::Verdict;

use crate::ml::MlPrediction;

/// Provenance of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub ticker: String,
    /// UTC, ISO 8601 with offset, second precision.
    pub last_updated: String,
    pub data_source: DataSource,
}

impl Meta {
    pub fn new(ticker: &str, last_updated: DateTime<Utc>, data_source: DataSource) -> Self {
        Self {
            ticker: ticker.to_string(),
            last_updated: last_updated.to_rfc3339_opts(SecondsFormat::Secs, false),
            data_source,
        }
    }
}

/// Latest scalar metrics with the verdict and any model outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    #[serde(flatten)]
    pub market: MarketMetrics,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_regime_label: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_regime_prob: Option<Vec<f64>>,
}

impl SnapshotMetrics {
    pub fn new(market: MarketMetrics, verdict: Verdict, ml: Option<&MlPrediction>) -> Self {
        Self {
            market,
            verdict,
            ml_regime_label: ml.and_then(|p| p.regime_label),
            ml_regime_prob: ml
                .map(|p| p.regime_prob.clone())
                .filter(|probs| !probs.is_empty()),
        }
    }
}

/// One row of `features_head`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    pub amihud: f64,
    pub lambda: f64,
    pub mfc: f64,
    pub vol_zscore: f64,
    pub volatility: f64,
    pub ret: f64,
    pub hlc_ratio: f64,
    pub tod: f64,
}

impl From<&FeatureRow> for FeatureRecord {
    fn from(row: &FeatureRow) -> Self {
        let bar = &row.bar;
        Self {
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            amihud: row.amihud,
            lambda: row.lambda,
            mfc: row.mfc,
            vol_zscore: row.vol_zscore,
            volatility: row.volatility,
            ret: row.ret,
            hlc_ratio: row.hlc_ratio,
            tod: row.tod,
        }
    }
}

/// ISO 8601 key for a bar timestamp (`2024-06-14T15:30:00`).
pub fn timestamp_key(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Last `n` feature rows keyed by timestamp.
pub fn features_head(rows: &[FeatureRow], n: usize) -> BTreeMap<String, FeatureRecord> {
    rows[rows.len().saturating_sub(n)..]
        .iter()
        .map(|row| (timestamp_key(&row.bar.timestamp), FeatureRecord::from(row)))
        .collect()
}

/// The full snapshot written to `{ticker}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub meta: Meta,
    pub metrics: SnapshotMetrics,
    pub features_head: BTreeMap<String, FeatureRecord>,
    #[serde(flatten)]
    pub series: DerivedSeries,
}

impl Snapshot {
    /// The same snapshot published under another name.
    pub fn renamed(&self, ticker: &str) -> Self {
        let mut copy = self.clone();
        copy.meta.ticker = ticker.to_string();
        copy
    }
}

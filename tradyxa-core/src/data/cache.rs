//! Local CSV cache of raw OHLCV history.
//!
//! Layout: `{cache_dir}/{FILE_KEY}.csv` with a `Date,Open,High,Low,Close,Volume`
//! header, one row per bar. Files written by other tools (pandas `to_csv`
//! with a `Datetime` index, float volumes, empty cells) load as well.
//!
//! Writes are atomic: write to `.tmp`, then rename into place.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::canonicalize::canonicalize;
use crate::domain::{file_key, Bar};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached data for '{symbol}' at {path}")]
    NotCached { symbol: String, path: PathBuf },

    #[error("cached file for '{symbol}' has no usable rows")]
    Empty { symbol: String },

    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "Datetime", alias = "date", alias = "timestamp", alias = "")]
    date: String,
    #[serde(rename = "Open", alias = "open", deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", alias = "high", deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", alias = "low", deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", alias = "close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(rename = "Volume", alias = "volume", deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CsvOut<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
}

impl CsvRow {
    fn into_bar(self) -> Option<Bar> {
        let timestamp = parse_timestamp(&self.date)?;
        Some(Bar {
            timestamp,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self
                .volume
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0),
        })
    }
}

/// Parse the timestamp formats seen in cached files.
///
/// Offsets are dropped: the wall-clock time at the exchange is what
/// `time_of_day` should see.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z")
        .ok()
        .map(|ts| ts.naive_local())
}

/// The CSV cache.
#[derive(Debug, Clone)]
pub struct CsvCache {
    cache_dir: PathBuf,
}

impl CsvCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the CSV file for a symbol.
    pub fn path(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", file_key(symbol)))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.path(symbol).is_file()
    }

    /// Load and canonicalize the cached bars for a symbol.
    ///
    /// Rows with an unparseable timestamp or a missing price are skipped.
    pub fn load(&self, symbol: &str) -> Result<Vec<Bar>, CacheError> {
        let path = self.path(symbol);
        if !path.is_file() {
            return Err(CacheError::NotCached {
                symbol: symbol.to_string(),
                path,
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(|source| CacheError::Csv {
                path: path.clone(),
                source,
            })?;

        let mut bars = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|source| CacheError::Csv {
                path: path.clone(),
                source,
            })?;
            if let Some(bar) = row.into_bar() {
                bars.push(bar);
            }
        }

        let bars = canonicalize(bars);
        if bars.is_empty() {
            return Err(CacheError::Empty {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    /// Write bars for a symbol, replacing any existing file atomically.
    pub fn write(&self, symbol: &str, bars: &[Bar]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;
        let path = self.path(symbol);
        let tmp = path.with_extension("csv.tmp");

        let csv_err = |source| CacheError::Csv {
            path: tmp.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&tmp).map_err(csv_err)?;
        for bar in bars {
            let date = bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
            writer
                .serialize(CsvOut {
                    date: &date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                })
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(|source| CacheError::Io { path, source })
    }
}

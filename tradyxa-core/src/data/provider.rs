//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over remote price sources so the runner
//! can fall back between cache, network and synthetic data, and so tests can
//! inject a mock. Retry, backoff and timeouts are the provider's business.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider returned no bars for {symbol}")]
    Empty { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Local CSV cache.
    Cache,
    /// Fresh download through a `DataProvider`.
    Provider,
    /// Deterministic synthetic series.
    Synthetic,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Cache => "cache",
            DataSource::Provider => "provider",
            DataSource::Synthetic => "synthetic",
        }
    }
}

/// Trait for remote OHLCV sources.
///
/// Implementations return bars in any order; callers canonicalize.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch OHLCV bars for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}

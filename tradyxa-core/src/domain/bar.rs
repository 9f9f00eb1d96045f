//! Bar — the fundamental market data unit.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single instrument and trading period.
///
/// Daily bars carry a midnight (or exchange-close) timestamp; intraday bars
/// carry the bar's start time. Series are ordered ascending by `timestamp`
/// with no duplicates once they have been through `data::canonicalize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Structural problems with a bar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar at {0} has a non-finite price")]
    NonFinitePrice(NaiveDateTime),
    #[error("bar at {0} has high below low")]
    InvertedRange(NaiveDateTime),
}

impl Bar {
    /// Returns true if any OHLC field is NaN or infinite (void bar).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, open/close inside the range, positive close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
    }

    /// Strict validation used at ingestion boundaries.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.is_void() {
            return Err(BarError::NonFinitePrice(self.timestamp));
        }
        if self.high < self.low {
            return Err(BarError::InvertedRange(self.timestamp));
        }
        Ok(())
    }

    /// Traded value of the bar: close × volume.
    pub fn dollar_volume(&self) -> f64 {
        self.close * self.volume as f64
    }

    /// Fractional hour of day of the bar timestamp (0.0 for midnight-stamped daily bars).
    pub fn time_of_day(&self) -> f64 {
        self.timestamp.hour() as f64 + self.timestamp.minute() as f64 / 60.0
    }
}

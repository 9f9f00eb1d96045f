//! Derived-series generators.
//!
//! Presentation-oriented transforms of the raw bar series: each generator
//! returns a vector of small records that the dashboard plots directly.
//! JSON keys are camelCase, dates are `YYYY-MM-DD`, prices are rounded to
//! 2 decimals.

pub mod absorption;
pub mod averages;
pub mod candles;
pub mod heatmap;
pub mod histogram;
pub mod orderbook;
pub mod profile;
pub mod samples;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::rng::SeedHierarchy;
use crate::window::trailing;

pub use absorption::{absorption_flow, AbsorptionPoint};
pub use averages::{bollinger_bands, rolling_averages, BollingerPoint, RollingAveragePoint};
pub use candles::{candles, Candle};
pub use heatmap::{heatmap, HeatmapCell};
pub use histogram::{returns_histogram, HistogramBin};
pub use orderbook::{orderbook, OrderbookLevel};
pub use profile::{volume_profile, ProfileLevel};
pub use samples::{slippage_samples, SlippageSample};

/// Generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Points kept for candles, bands, averages and absorption flow.
    pub chart_points: usize,
    pub profile_buckets: usize,
    pub profile_lookback: usize,
    pub bollinger_window: usize,
    pub bollinger_std: f64,
    /// Short, mid and long moving-average windows.
    pub ma_windows: [usize; 3],
    pub histogram_bins: usize,
    pub orderbook_levels: usize,
    pub orderbook_base_qty: f64,
    pub orderbook_decay: f64,
    /// Minimum ladder step as a fraction of price.
    pub orderbook_min_step: f64,
    pub orderbook_vol_window: usize,
    pub heatmap_first_hour: u32,
    pub heatmap_hour_pattern: Vec<f64>,
    pub heatmap_day_pattern: Vec<f64>,
    pub slippage_samples: usize,
    pub slippage_lookback: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            chart_points: 60,
            profile_buckets: 20,
            profile_lookback: 60,
            bollinger_window: 20,
            bollinger_std: 2.0,
            ma_windows: [5, 20, 50],
            histogram_bins: 8,
            orderbook_levels: 10,
            orderbook_base_qty: 5000.0,
            orderbook_decay: 0.3,
            orderbook_min_step: 0.001,
            orderbook_vol_window: 20,
            heatmap_first_hour: 9,
            heatmap_hour_pattern: vec![0.3, 0.5, 0.7, 0.8, 1.0, 0.9, 0.8, 0.6, 0.4],
            heatmap_day_pattern: vec![0.7, 0.75, 0.8, 0.85, 1.0],
            slippage_samples: 50,
            slippage_lookback: 100,
        }
    }
}

/// Every derived series for one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSeries {
    pub volume_profile: Vec<ProfileLevel>,
    pub candles: Vec<Candle>,
    pub bollinger_bands: Vec<BollingerPoint>,
    pub orderbook: Vec<OrderbookLevel>,
    pub rolling_averages: Vec<RollingAveragePoint>,
    pub absorption_flow: Vec<AbsorptionPoint>,
    pub heatmap: Vec<HeatmapCell>,
    pub histogram: Vec<HistogramBin>,
    pub slippage_samples: Vec<SlippageSample>,
}

impl DerivedSeries {
    pub fn generate(
        bars: &[Bar],
        config: &SeriesConfig,
        instrument: &str,
        seeds: &SeedHierarchy,
    ) -> Self {
        Self {
            volume_profile: volume_profile(bars, config),
            candles: candles(bars, config.chart_points),
            bollinger_bands: bollinger_bands(bars, config),
            orderbook: orderbook(bars, config),
            rolling_averages: rolling_averages(bars, config),
            absorption_flow: absorption_flow(bars, config.chart_points),
            heatmap: heatmap(config, instrument, seeds),
            histogram: returns_histogram(bars, config.histogram_bins),
            slippage_samples: slippage_samples(bars, config, instrument, seeds),
        }
    }
}

pub(crate) fn date_label(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Last `n` elements of a slice.
pub(crate) fn tail<T>(data: &[T], n: usize) -> &[T] {
    &data[data.len().saturating_sub(n)..]
}

/// Rolling statistic that is `None` until the window is full.
pub(crate) fn rolling_opt<F>(values: &[f64], size: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    for (i, w) in trailing(values, size) {
        out[i] = f(w).filter(|x| x.is_finite());
    }
    out
}

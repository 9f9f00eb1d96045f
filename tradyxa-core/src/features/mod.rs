//! Feature extractor: per-bar liquidity, impact and flow features.
//!
//! `compute_features` turns an ordered OHLCV series into one `FeatureRow`
//! per bar. Rolling features look only at bars at or before the current one
//! and hold 0.0 until their window is full. Features built on price changes
//! (`lambda`, `mfc`, `volatility`, `coordinated_flow`) need `window` observed
//! changes, so their first non-default value is at index `window`;
//! `vol_zscore` works on volume levels and starts at `window - 1`.
//!
//! Every value is finite: NaN and infinities are mapped to 0.0 at the source.

pub mod flow;
pub mod liquidity;

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::window::{finite_or_zero, normalize_to_01, trailing};

pub use flow::{coordinated_flow, rolling_volatility, sign, simple_returns, volume_zscore};
pub use liquidity::{amihud, market_friction, price_impact_lambda};

/// Feature extractor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rolling window length shared by all rolling features.
    pub window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

/// One bar plus its derived features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub amihud: f64,
    pub lambda: f64,
    pub mfc: f64,
    pub vol_zscore: f64,
    pub volatility: f64,
    pub coordinated_flow: f64,
    pub ret: f64,
    pub hlc_ratio: f64,
    pub tod: f64,
}

impl FeatureRow {
    pub fn close(&self) -> f64 {
        self.bar.close
    }

    pub fn dollar_volume(&self) -> f64 {
        self.bar.dollar_volume()
    }
}

/// Compute the full feature set for an ordered bar series.
///
/// Output has the same length and order as `bars`.
pub fn compute_features(bars: &[Bar], config: &FeatureConfig) -> Vec<FeatureRow> {
    let w = config.window;
    let ret = simple_returns(bars);
    let amihud = amihud(bars, &ret);
    let lambda = price_impact_lambda(bars, w);
    let mfc = market_friction(bars, w);
    let vol_z = volume_zscore(bars, w);
    let volatility = rolling_volatility(&ret, w);
    let cflow = coordinated_flow(&ret, &vol_z, w);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| FeatureRow {
            bar: bar.clone(),
            amihud: amihud[i],
            lambda: lambda[i],
            mfc: mfc[i],
            vol_zscore: vol_z[i],
            volatility: volatility[i],
            coordinated_flow: cflow[i],
            ret: ret[i],
            hlc_ratio: finite_or_zero((bar.high - bar.low) / bar.close),
            tod: bar.time_of_day(),
        })
        .collect()
}

/// Rolling statistic over a series of bar-to-bar changes.
///
/// `changes[j]` describes the move into bar `j + 1`, so the result is one
/// element longer than `changes` and aligned to bars: index 0 and every bar
/// without `window` preceding changes hold 0.0.
pub(crate) fn rolling_over_changes<T, F>(changes: &[T], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[T]) -> f64,
{
    let mut out = vec![0.0; changes.len() + 1];
    for (j, w) in trailing(changes, window) {
        out[j + 1] = finite_or_zero(f(w));
    }
    out
}

/// Scalar metrics at the latest bar, consumed by the verdict aggregator and
/// published in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetrics {
    pub spot_price: f64,
    /// VIX-like volatility level supplied by the caller.
    pub vix_latest: f64,
    pub amihud_latest: f64,
    pub lambda_latest: f64,
    pub mfc_latest: f64,
    pub vol_zscore_latest: f64,
    pub volatility_latest: f64,
    /// Latest lambda after min-max normalization over the whole series, in [0, 1].
    pub liquidity_depth_proxy: f64,
    /// 1 − latest min-max normalized mfc, in [0, 1].
    pub trade_sizing_multiplier: f64,
    pub coordinated_flow: f64,
}

impl MarketMetrics {
    /// Metrics for the last row of `rows`. An empty series gives all zeros
    /// (and a multiplier of 1.0).
    pub fn from_features(rows: &[FeatureRow], vix_level: f64) -> Self {
        let lambdas: Vec<f64> = rows.iter().map(|r| r.lambda).collect();
        let mfcs: Vec<f64> = rows.iter().map(|r| r.mfc).collect();
        let depth = normalize_to_01(&lambdas).last().copied().unwrap_or(0.0);
        let friction = normalize_to_01(&mfcs).last().copied().unwrap_or(0.0);

        let last = rows.last();
        let pick = |f: fn(&FeatureRow) -> f64| last.map(f).map(finite_or_zero).unwrap_or(0.0);

        Self {
            spot_price: pick(|r| r.bar.close),
            vix_latest: finite_or_zero(vix_level),
            amihud_latest: pick(|r| r.amihud),
            lambda_latest: pick(|r| r.lambda),
            mfc_latest: pick(|r| r.mfc),
            vol_zscore_latest: pick(|r| r.vol_zscore),
            volatility_latest: pick(|r| r.volatility),
            liquidity_depth_proxy: depth,
            trade_sizing_multiplier: 1.0 - friction,
            coordinated_flow: pick(|r| r.coordinated_flow),
        }
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar), high/low = ±1.0 around the
/// body, volume = 1000, one bar per day starting 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    make_bars_with_volume(closes, &vec![1000; closes.len()])
}

/// Like `make_bars`, with explicit volumes.
#[cfg(test)]
pub fn make_bars_with_volume(closes: &[f64], volumes: &[u64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for feature tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

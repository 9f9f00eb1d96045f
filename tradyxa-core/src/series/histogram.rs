//! Histogram of daily close-to-close returns, in percent.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::window::{linspace, round_dp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Bin midpoint, percent return.
    pub bin: f64,
    pub count: usize,
    /// Share of all returns in this bin, percent.
    pub percentage: f64,
}

/// Histogram of close-to-close percent returns over equal-width bins.
///
/// The last bin includes its right edge. A single distinct return value is
/// spread over a ±0.5 percentage-point range.
pub fn returns_histogram(bars: &[Bar], bins: usize) -> Vec<HistogramBin> {
    let returns: Vec<f64> = bars
        .windows(2)
        .map(|w| (w[1].close / w[0].close - 1.0) * 100.0)
        .filter(|r| r.is_finite())
        .collect();
    if returns.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo < 1e-12 {
        lo -= 0.5;
        hi += 0.5;
    }
    let edges = linspace(lo, hi, bins + 1);
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for r in &returns {
        let idx = (((r - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = returns.len() as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            bin: round_dp((edges[i] + edges[i + 1]) / 2.0, 2),
            count,
            percentage: round_dp(count as f64 / total * 100.0, 1),
        })
        .collect()
}

//! Presentation slippage samples: expected vs. filled price on random recent bars.
//!
//! Slippage (percent) falls with relative volume:
//! `0.1 / (volume / mean_volume + 0.5) + N(0, 0.02)`, floored at zero.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{date_label, tail, SeriesConfig};
use crate::domain::Bar;
use crate::rng::{SeedHierarchy, Stream};
use crate::window::{mean, round_dp};

const BASE_SLIPPAGE_PCT: f64 = 0.1;
const NOISE_PCT: f64 = 0.02;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageSample {
    pub timestamp: String,
    pub expected: f64,
    pub actual: f64,
    /// Percent.
    pub slippage: f64,
    pub volume: u64,
}

pub fn slippage_samples(
    bars: &[Bar],
    config: &SeriesConfig,
    instrument: &str,
    seeds: &SeedHierarchy,
) -> Vec<SlippageSample> {
    let recent = tail(bars, config.slippage_lookback);
    if recent.is_empty() {
        return Vec::new();
    }
    let volumes: Vec<f64> = recent.iter().map(|b| b.volume as f64).collect();
    let avg_volume = mean(&volumes).unwrap_or(0.0);
    let Ok(noise) = Normal::new(0.0, NOISE_PCT) else {
        return Vec::new();
    };
    let mut rng = seeds.rng_for(instrument, Stream::SlippageSamples, 0);

    (0..config.slippage_samples)
        .map(|_| {
            let bar = &recent[rng.gen_range(0..recent.len())];
            let ratio = if avg_volume > 0.0 {
                bar.volume as f64 / avg_volume
            } else {
                0.0
            };
            let slippage =
                (BASE_SLIPPAGE_PCT / (ratio + 0.5) + noise.sample(&mut rng)).max(0.0);
            SlippageSample {
                timestamp: date_label(&bar.timestamp),
                expected: round_dp(bar.close, 2),
                actual: round_dp(bar.close * (1.0 + slippage / 100.0), 2),
                slippage: round_dp(slippage, 3),
                volume: bar.volume,
            }
        })
        .collect()
}

//! Monte Carlo resampling slippage simulation.
//!
//! Each trial picks a bar uniformly at random, caps execution at a random
//! fraction of that bar's dollar volume, prices the executed value with the
//! Monte Carlo impact law and adds volatility-scaled noise. The generator is
//! seeded from `(instrument, notional)`, so repeated calls reproduce the
//! same draws and different notionals draw independently.

use rand::Rng;
use rand_distr::StandardNormal;

use super::{SlippageConfig, SlippageSummary};
use crate::features::FeatureRow;
use crate::rng::{SeedHierarchy, Stream};
use crate::window::mean;

/// Dollar volume assumed for a bar that did not trade: mean close × mean volume
/// (volume floored at 1).
fn fallback_dollar_volume(rows: &[FeatureRow]) -> f64 {
    let closes: Vec<f64> = rows.iter().map(|r| r.bar.close).collect();
    let volumes: Vec<f64> = rows.iter().map(|r| r.bar.volume as f64).collect();
    let close = mean(&closes).unwrap_or(0.0);
    let volume = mean(&volumes).unwrap_or(0.0).max(1.0);
    close * volume
}

/// Simulate `config.n_sim` trades of `notional` against random bars of `rows`.
///
/// An empty series yields an empty, low-data summary.
pub fn simulate_monte_carlo(
    rows: &[FeatureRow],
    notional: f64,
    config: &SlippageConfig,
    instrument: &str,
    seeds: &SeedHierarchy,
) -> SlippageSummary {
    if rows.is_empty() {
        return SlippageSummary::from_sample(Vec::new(), true);
    }

    let mut rng = seeds.rng_for(instrument, Stream::MonteCarlo, notional.to_bits());
    let fallback = fallback_dollar_volume(rows);
    let (lo, hi) = config.participation_range;

    let mut sample = Vec::with_capacity(config.n_sim);
    for _ in 0..config.n_sim {
        let row = &rows[rng.gen_range(0..rows.len())];
        let participation = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        let mut dv = row.dollar_volume();
        if !(dv > 0.0) {
            dv = fallback;
        }
        let executed = notional.min(participation * dv);
        let rel = executed / dv.max(1.0);
        let impact = config.monte_carlo_law.impact(rel);

        let z: f64 = rng.sample(StandardNormal);
        let impact = impact + z * config.noise_scale * row.volatility;
        sample.push(if impact.is_finite() { impact.max(0.0) } else { 0.0 });
    }

    let low_data = sample.len() < config.monte_carlo_min_samples;
    SlippageSummary::from_sample(sample, low_data)
}

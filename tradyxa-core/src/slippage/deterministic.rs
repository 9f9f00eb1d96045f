//! Deterministic bar-walk slippage simulation.
//!
//! One sample per bar: participation `rel = notional / max(dollar_volume, 1)`,
//! impact from the deterministic impact law, plus noise drawn from a
//! generator seeded by the bar's timestamp. The same bars always produce the
//! same sample, whatever the notional or thread.

use rand::Rng;
use rand_distr::StandardNormal;

use super::{SlippageConfig, SlippageSummary};
use crate::features::FeatureRow;
use crate::rng::{SeedHierarchy, Stream};

/// Mean of the positive bar dollar volumes, if any bar traded.
pub fn average_dollar_volume(rows: &[FeatureRow]) -> Option<f64> {
    let traded: Vec<f64> = rows
        .iter()
        .map(|r| r.dollar_volume())
        .filter(|dv| dv.is_finite() && *dv > 0.0)
        .collect();
    if traded.is_empty() {
        return None;
    }
    let avg = traded.iter().sum::<f64>() / traded.len() as f64;
    (avg.is_finite() && avg > 0.0).then_some(avg)
}

/// Simulate the cost of trading `notional` against every bar of `rows`.
///
/// Bars without traded value are priced at the series' average dollar volume
/// (or `fallback_dollar_volume` when nothing traded). The summary is low-data
/// when there are fewer than `deterministic_min_samples` bars, when no bar
/// traded, or when the notional exceeds `extrapolation_multiple` times the
/// average dollar volume.
pub fn simulate_deterministic(
    rows: &[FeatureRow],
    notional: f64,
    config: &SlippageConfig,
    instrument: &str,
    seeds: &SeedHierarchy,
) -> SlippageSummary {
    let observed_avg = average_dollar_volume(rows);
    let avg_dv = observed_avg.unwrap_or(config.fallback_dollar_volume);

    let sample: Vec<f64> = rows
        .iter()
        .map(|row| {
            let mut dv = row.dollar_volume();
            if !(dv > 0.0) {
                dv = avg_dv;
            }
            let rel = notional / dv.max(1.0);
            let impact = config.deterministic_law.impact(rel);

            let scale = config.noise_scale * row.volatility;
            let discriminator = row.bar.timestamp.and_utc().timestamp_millis() as u64;
            let mut rng = seeds.rng_for(instrument, Stream::BarNoise, discriminator);
            let z: f64 = rng.sample(StandardNormal);
            let impact = impact + z * scale;
            if impact.is_finite() {
                impact.max(0.0)
            } else {
                0.0
            }
        })
        .collect();

    let low_data = sample.len() < config.deterministic_min_samples
        || observed_avg.is_none()
        || notional > config.extrapolation_multiple * avg_dv;

    SlippageSummary::from_sample(sample, low_data)
}

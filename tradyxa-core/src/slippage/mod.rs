//! Slippage simulators.
//!
//! Two independent estimators of the fractional execution cost of a trade of
//! a given notional size:
//!
//! - [`deterministic`]: walks every bar once, participation = notional / bar
//!   dollar volume, with per-bar seeded noise.
//! - [`monte_carlo`]: resamples random bars with a random participation cap,
//!   seeded from the notional.
//!
//! Both apply the impact power law `impact = k · rel^alpha`, add zero-mean
//! Gaussian noise scaled by the bar's volatility, clamp at zero and summarize
//! the resulting sample into a [`SlippageSummary`].

pub mod deterministic;
pub mod monte_carlo;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::window::{percentile_sorted, sorted_copy};

pub use deterministic::simulate_deterministic;
pub use monte_carlo::simulate_monte_carlo;

// ─── Configuration ───────────────────────────────────────────────────

/// Power-law impact model `k · rel^alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactLaw {
    pub k: f64,
    pub alpha: f64,
}

impl ImpactLaw {
    /// Impact fraction for a participation ratio. Negative ratios are treated as 0.
    pub fn impact(&self, rel: f64) -> f64 {
        self.k * rel.max(0.0).powf(self.alpha)
    }
}

/// Simulator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlippageConfig {
    /// Trade sizes to simulate, in currency units.
    pub notionals: Vec<f64>,
    /// Noise std-dev as a multiple of the bar's volatility.
    pub noise_scale: f64,
    /// Monte Carlo trial count.
    pub n_sim: usize,
    /// Range of the per-trial participation cap.
    pub participation_range: (f64, f64),
    /// Below this many samples the deterministic summary is low-data.
    pub deterministic_min_samples: usize,
    /// Below this many samples the Monte Carlo summary is low-data.
    pub monte_carlo_min_samples: usize,
    /// Notionals above this multiple of the average dollar volume are low-data.
    pub extrapolation_multiple: f64,
    /// Average dollar volume assumed when no bar traded.
    pub fallback_dollar_volume: f64,
    pub deterministic_law: ImpactLaw,
    pub monte_carlo_law: ImpactLaw,
}

impl Default for SlippageConfig {
    fn default() -> Self {
        Self {
            notionals: vec![100_000.0, 250_000.0, 500_000.0, 1_000_000.0],
            deterministic_law: ImpactLaw { k: 0.8, alpha: 0.9 },
            monte_carlo_law: ImpactLaw { k: 0.9, alpha: 0.9 },
            noise_scale: 0.5,
            n_sim: 400,
            participation_range: (0.05, 0.6),
            deterministic_min_samples: 10,
            monte_carlo_min_samples: 50,
            extrapolation_multiple: 10.0,
            fallback_dollar_volume: 1_000_000.0,
        }
    }
}

impl SlippageConfig {
    /// Smallest configured notional, the one the verdict prices cost with.
    pub fn smallest_notional(&self) -> Option<f64> {
        self.notionals.iter().copied().reduce(f64::min)
    }
}

// ─── Summary ─────────────────────────────────────────────────────────

/// Distributional summary of simulated impact fractions for one notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageSummary {
    pub median: f64,
    pub p90: f64,
    pub p10: f64,
    #[serde(alias = "dist_sample")]
    pub sample: Vec<f64>,
    pub low_data: bool,
    /// Externally predicted median slippage (quantile regression output).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_p90: Option<f64>,
}

impl SlippageSummary {
    /// Summarize a sample. An empty sample has zero statistics.
    pub fn from_sample(sample: Vec<f64>, low_data: bool) -> Self {
        let sorted = sorted_copy(&sample);
        Self {
            median: percentile_sorted(&sorted, 50.0),
            p90: percentile_sorted(&sorted, 90.0),
            p10: percentile_sorted(&sorted, 10.0),
            sample,
            low_data,
            predicted_median: None,
            predicted_p90: None,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.sample.len()
    }
}

/// Summaries keyed by notional, in the order the notionals were simulated.
///
/// Serializes as a JSON object keyed by the notional rendered as an integer
/// string (`"100000"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlippageTable {
    entries: Vec<(f64, SlippageSummary)>,
}

impl SlippageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the summary for `notional`.
    pub fn insert(&mut self, notional: f64, summary: SlippageSummary) {
        match self.entries.iter_mut().find(|(n, _)| *n == notional) {
            Some(entry) => entry.1 = summary,
            None => self.entries.push((notional, summary)),
        }
    }

    pub fn get(&self, notional: f64) -> Option<&SlippageSummary> {
        self.entries
            .iter()
            .find(|(n, _)| *n == notional)
            .map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, notional: f64) -> Option<&mut SlippageSummary> {
        self.entries
            .iter_mut()
            .find(|(n, _)| *n == notional)
            .map(|(_, s)| s)
    }

    /// Summary for the smallest notional present.
    pub fn smallest(&self) -> Option<&SlippageSummary> {
        self.entries
            .iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, s)| s)
    }

    pub fn smallest_mut(&mut self) -> Option<&mut SlippageSummary> {
        self.entries
            .iter_mut()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &SlippageSummary)> {
        self.entries.iter().map(|(n, s)| (*n, s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SlippageTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (notional, summary) in &self.entries {
            map.serialize_entry(&notional_key(*notional), summary)?;
        }
        map.end()
    }
}

/// JSON key for a notional: integer rendering when whole.
pub fn notional_key(notional: f64) -> String {
    if notional.fract() == 0.0 && notional.abs() < 1e15 {
        format!("{}", notional as i64)
    } else {
        notional.to_string()
    }
}

/// Run both simulators for every configured notional.
pub fn simulate_all(
    rows: &[crate::features::FeatureRow],
    config: &SlippageConfig,
    instrument: &str,
    seeds: &crate::rng::SeedHierarchy,
) -> (SlippageTable, SlippageTable) {
    let mut det = SlippageTable::new();
    let mut mc = SlippageTable::new();
    for &notional in &config.notionals {
        det.insert(
            notional,
            simulate_deterministic(rows, notional, config, instrument, seeds),
        );
        mc.insert(
            notional,
            simulate_monte_carlo(rows, notional, config, instrument, seeds),
        );
    }
    (det, mc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_law_power() {
        let law = ImpactLaw { k: 0.8, alpha: 0.9 };
        assert_eq!(law.impact(0.0), 0.0);
        assert!((law.impact(1.0) - 0.8).abs() < 1e-12);
        assert_eq!(law.impact(-1.0), 0.0);
    }

    #[test]
    fn summary_percentiles_interpolate() {
        let s = SlippageSummary::from_sample(vec![4.0, 1.0, 3.0, 2.0, 5.0], false);
        assert_eq!(s.median, 3.0);
        assert!((s.p90 - 4.6).abs() < 1e-12);
        assert!((s.p10 - 1.4).abs() < 1e-12);
        // Sample keeps simulation order
        assert_eq!(s.sample[0], 4.0);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = SlippageSummary::from_sample(Vec::new(), true);
        assert_eq!((s.median, s.p90, s.p10), (0.0, 0.0, 0.0));
        assert!(s.low_data);
    }

    #[test]
    fn table_serializes_with_integer_keys() {
        let mut table = SlippageTable::new();
        table.insert(250_000.0, SlippageSummary::from_sample(vec![0.2], true));
        table.insert(100_000.0, SlippageSummary::from_sample(vec![0.1], true));
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["100000"]["median"], 0.1);
        assert!(json["250000"].get("predicted_median").is_none());
        assert_eq!(table.smallest().unwrap().median, 0.1);
    }

    #[test]
    fn notional_keys() {
        assert_eq!(notional_key(1_000_000.0), "1000000");
        assert_eq!(notional_key(1.5), "1.5");
    }

    #[test]
    fn smallest_notional_of_config() {
        assert_eq!(SlippageConfig::default().smallest_notional(), Some(100_000.0));
    }
}

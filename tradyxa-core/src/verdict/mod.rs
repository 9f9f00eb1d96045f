//! Verdict aggregator.
//!
//! Blends normalized momentum, flow, liquidity and execution-cost signals
//! (plus optional ML regime / slippage predictions) into one directional
//! call with a confidence and an error band.
//!
//! [`compute_verdict`] returns `Result<Verdict, ComputationFailure>`; callers
//! that always need a verdict use [`compute_verdict_or_neutral`], which logs
//! the failure and substitutes [`Verdict::neutral_fallback`].

mod aggregate;
mod explain;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureRow, MarketMetrics};
use crate::slippage::SlippageTable;

pub use aggregate::{compute_verdict, compute_verdict_or_neutral};
pub(crate) use aggregate::check_params;
pub use explain::explanation;

pub const VERDICT_VERSION: &str = "verdict_v1";

// ─── Enums ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    /// NEUTRAL inside the band, otherwise the sign of the score.
    pub fn from_score(score: f64, neutral_band: f64) -> Self {
        if score.abs() < neutral_band {
            Direction::Neutral
        } else if score > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Neutral => "NEUTRAL",
        }
    }
}

/// Tag for the amount of simulated slippage evidence behind a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataQuality {
    Good,
    Low,
    Insufficient,
}

/// Execution-cost regime produced by the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Regime {
    Low,
    Normal,
    High,
    Severe,
}

impl Regime {
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(Regime::Low),
            1 => Some(Regime::Normal),
            2 => Some(Regime::High),
            3 => Some(Regime::Severe),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Low => "LOW",
            Regime::Normal => "NORMAL",
            Regime::High => "HIGH",
            Regime::Severe => "SEVERE",
        }
    }
}

// ─── Parameters ──────────────────────────────────────────────────────

/// Aggregator constants. All of them are tunable defaults, not invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictParams {
    pub w_momentum: f64,
    pub w_flow: f64,
    pub w_liquidity: f64,
    pub w_cost: f64,
    pub w_ml_regime: f64,
    pub w_ml_slippage: f64,
    /// Bars in the trailing momentum return.
    pub momentum_lookback: usize,
    /// Momentum z-score clip; the clipped value is divided by it.
    pub momentum_clip: f64,
    pub flow_scale: f64,
    /// Logistic center of the cost penalty, in percent slippage.
    pub cost_center_pct: f64,
    pub cost_steepness: f64,
    /// Additive contribution per regime label 0..=3.
    pub regime_penalties: [f64; 4],
    /// Contribution per unit of predicted median slippage (negated).
    pub ml_slippage_scale: f64,
    pub confidence_alpha: f64,
    pub neutral_band: f64,
    pub vix_divisor: f64,
    pub vol_scale_min: f64,
    pub vol_scale_max: f64,
    pub realized_vol_min: f64,
    pub realized_vol_max: f64,
    /// |points| never exceeds this fraction of the last close.
    pub max_points_fraction: f64,
    /// Below this confidence points are rounded to `rounding_step`.
    pub low_confidence: f64,
    pub rounding_step: f64,
    /// Above this confidence the explanation recommends TWAP slicing.
    pub sizing_confidence: f64,
    pub good_samples: usize,
    pub low_samples: usize,
    /// Substituted when a metric is zero (not yet available).
    pub default_vix: f64,
    pub default_realized_vol: f64,
    pub default_momentum_vol: f64,
}

impl Default for VerdictParams {
    fn default() -> Self {
        Self {
            w_momentum: 0.45,
            w_flow: 0.25,
            w_liquidity: 0.15,
            w_cost: 0.15,
            w_ml_regime: 0.10,
            w_ml_slippage: 0.05,
            momentum_lookback: 5,
            momentum_clip: 3.0,
            flow_scale: 2.0,
            cost_center_pct: 0.5,
            cost_steepness: 4.0,
            regime_penalties: [0.10, 0.0, -0.15, -0.25],
            ml_slippage_scale: 5.0,
            confidence_alpha: 3.0,
            neutral_band: 0.05,
            vix_divisor: 20.0,
            vol_scale_min: 0.2,
            vol_scale_max: 3.0,
            realized_vol_min: 0.001,
            realized_vol_max: 0.05,
            max_points_fraction: 0.05,
            low_confidence: 0.4,
            rounding_step: 5.0,
            sizing_confidence: 0.5,
            good_samples: 50,
            low_samples: 10,
            default_vix: 12.0,
            default_realized_vol: 0.005,
            default_momentum_vol: 0.001,
        }
    }
}

impl VerdictParams {
    pub fn regime_penalty(&self, regime: Regime) -> f64 {
        self.regime_penalties[regime.index()]
    }

    /// Data-confidence tier for a slippage sample count.
    pub fn data_tier(&self, samples: usize) -> (f64, DataQuality) {
        if samples >= self.good_samples {
            (1.0, DataQuality::Good)
        } else if samples >= self.low_samples {
            (0.7, DataQuality::Low)
        } else {
            (0.4, DataQuality::Insufficient)
        }
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Everything the aggregator reads. All borrowed, nothing mutated.
#[derive(Debug, Clone, Copy)]
pub struct VerdictInputs<'a> {
    /// Scalar metrics at the latest bar.
    pub metrics: &'a MarketMetrics,
    /// Full feature series; the last closes drive momentum.
    pub features: &'a [FeatureRow],
    /// Deterministic slippage summaries. The smallest notional prices cost
    /// and may carry an ML predicted median.
    pub slippage: &'a SlippageTable,
    /// Monte Carlo summaries, counted in `n_samples.monte`.
    pub monte_carlo: Option<&'a SlippageTable>,
    /// External regime classifier label (0..=3).
    pub ml_regime: Option<i64>,
}

// ─── Output ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub momentum: f64,
    pub flow: f64,
    pub liquidity: f64,
    pub impact_cost: f64,
    pub volatility_scale: f64,
    pub ml_regime_contribution: f64,
    pub ml_slippage_contribution: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NSamples {
    pub slippage: usize,
    pub monte: usize,
    pub features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub direction: Direction,
    /// Absolute magnitude estimate in price units.
    pub points: f64,
    pub error: f64,
    pub confidence: f64,
    pub score: f64,
    pub components: Components,
    pub explanation: String,
    pub data_quality: DataQuality,
    pub n_samples: NSamples,
    pub ml_enhanced: bool,
    pub version: String,
    pub params: Option<VerdictParams>,
}

impl Verdict {
    /// The documented "no signal" verdict.
    pub fn neutral_fallback() -> Self {
        Self {
            direction: Direction::Neutral,
            points: 0.0,
            error: 0.0,
            confidence: 0.0,
            score: 0.0,
            components: Components::default(),
            explanation: "verdict computation error".to_string(),
            data_quality: DataQuality::Insufficient,
            n_samples: NSamples::default(),
            ml_enhanced: false,
            version: VERDICT_VERSION.to_string(),
            params: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationFailure {
    #[error("non-finite input '{field}': {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("composite score is not finite: {0}")]
    NonFiniteScore(f64),

    #[error("invalid verdict parameters: {0}")]
    InvalidParams(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_band() {
        assert_eq!(Direction::from_score(0.049, 0.05), Direction::Neutral);
        assert_eq!(Direction::from_score(-0.049, 0.05), Direction::Neutral);
        assert_eq!(Direction::from_score(0.05, 0.05), Direction::Up);
        assert_eq!(Direction::from_score(-0.05, 0.05), Direction::Down);
    }

    #[test]
    fn data_tiers() {
        let p = VerdictParams::default();
        assert_eq!(p.data_tier(50), (1.0, DataQuality::Good));
        assert_eq!(p.data_tier(10), (0.7, DataQuality::Low));
        assert_eq!(p.data_tier(9), (0.4, DataQuality::Insufficient));
    }

    #[test]
    fn regime_lookup() {
        let p = VerdictParams::default();
        assert_eq!(p.regime_penalty(Regime::Low), 0.10);
        assert_eq!(p.regime_penalty(Regime::Severe), -0.25);
        assert_eq!(Regime::from_label(4), None);
    }

    #[test]
    fn fallback_serializes_uppercase() {
        let json = serde_json::to_value(Verdict::neutral_fallback()).unwrap();
        assert_eq!(json["direction"], "NEUTRAL");
        assert_eq!(json["data_quality"], "INSUFFICIENT");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["version"], "verdict_v1");
    }
}

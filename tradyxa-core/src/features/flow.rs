//! Return, volatility and volume-flow features.

use super::rolling_over_changes;
use crate::domain::Bar;
use crate::window::{finite_or_zero, mean, rolling, sample_std};

/// Simple close-to-close returns; 0.0 for the first bar and for undefined ratios.
pub fn simple_returns(bars: &[Bar]) -> Vec<f64> {
    let mut out = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        out[i] = finite_or_zero(bars[i].close / bars[i - 1].close - 1.0);
    }
    out
}

/// Rolling sample std-dev of returns over `window` observed returns.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }
    rolling_over_changes(&returns[1..], window, |w| sample_std(w).unwrap_or(0.0))
}

/// Volume z-score against its trailing window (current bar included).
///
/// 0.0 while the window is incomplete or when the window has no dispersion.
pub fn volume_zscore(bars: &[Bar], window: usize) -> Vec<f64> {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    rolling(&volumes, window, |w| {
        let current = w[w.len() - 1];
        match (mean(w), sample_std(w)) {
            (Some(m), Some(sd)) if sd > 0.0 => (current - m) / sd,
            _ => 0.0,
        }
    })
}

/// Rolling mean of `sign(ret) × vol_zscore`: volume surprises that line up
/// with the direction of the move.
pub fn coordinated_flow(returns: &[f64], vol_zscore: &[f64], window: usize) -> Vec<f64> {
    if returns.is_empty() {
        return Vec::new();
    }
    let signed: Vec<f64> = returns
        .iter()
        .zip(vol_zscore)
        .skip(1)
        .map(|(r, z)| sign(*r) * z)
        .collect();
    rolling_over_changes(&signed, window, |w| mean(w).unwrap_or(0.0))
}

/// Three-valued sign: -1, 0 or 1 (unlike `f64::signum`, zero maps to zero).
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

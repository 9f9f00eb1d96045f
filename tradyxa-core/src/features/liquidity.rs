//! Liquidity and price-impact features: Amihud illiquidity, Kyle-style
//! lambda, market friction coefficient.

use super::rolling_over_changes;
use crate::domain::Bar;
use crate::window::{finite_or_zero, mean, population_covariance, sample_variance};

/// Amihud illiquidity: |return| / dollar volume, 0.0 on bars with no traded value.
pub fn amihud(bars: &[Bar], returns: &[f64]) -> Vec<f64> {
    bars.iter()
        .zip(returns)
        .map(|(bar, r)| {
            let dv = bar.dollar_volume();
            if dv > 0.0 {
                finite_or_zero(r.abs() / dv)
            } else {
                0.0
            }
        })
        .collect()
}

/// Rolling price-impact slope of Δclose on volume.
///
/// Population covariance of (Δclose, volume) over the sample variance of
/// volume across `window` observed price changes; 0.0 when volume has no
/// dispersion in the window.
pub fn price_impact_lambda(bars: &[Bar], window: usize) -> Vec<f64> {
    let pairs: Vec<(f64, f64)> = bars
        .windows(2)
        .map(|w| (w[1].close - w[0].close, w[1].volume as f64))
        .collect();
    if bars.is_empty() {
        return Vec::new();
    }
    rolling_over_changes(&pairs, window, |w| {
        let volumes: Vec<f64> = w.iter().map(|p| p.1).collect();
        match (sample_variance(&volumes), population_covariance(w)) {
            (Some(var), Some(cov)) if var > 0.0 => cov / var,
            _ => 0.0,
        }
    })
}

/// Market friction coefficient: rolling mean of |Δclose| / volume, scaled by √window.
///
/// Zero-volume bars reuse the last non-zero volume; before any volume has
/// been seen the divisor is 1.
pub fn market_friction(bars: &[Bar], window: usize) -> Vec<f64> {
    if bars.is_empty() {
        return Vec::new();
    }
    let mut last_volume = 1.0_f64;
    let filled: Vec<f64> = bars
        .iter()
        .map(|b| {
            if b.volume > 0 {
                last_volume = b.volume as f64;
            }
            last_volume.max(1.0)
        })
        .collect();

    let ratios: Vec<f64> = bars
        .windows(2)
        .zip(filled.iter().skip(1))
        .map(|(w, vol)| (w[1].close - w[0].close).abs() / vol)
        .collect();

    let scale = (window as f64).sqrt();
    rolling_over_changes(&ratios, window, |w| mean(w).unwrap_or(0.0) * scale)
}

//! Volume profile: traded volume bucketed by price, with a buy/sell split.
//!
//! Each bar spreads its volume evenly over the price levels inside its
//! high/low range. Bullish bars lean toward buying near their high, other
//! bars toward selling near their low.

use serde::{Deserialize, Serialize};

use super::{tail, SeriesConfig};
use crate::domain::Bar;
use crate::window::{linspace, round_dp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileLevel {
    pub price: f64,
    pub volume: u64,
    pub buy_volume: u64,
    pub sell_volume: u64,
}

/// Share of a bar's volume at `level` attributed to buyers.
fn buy_ratio(bar: &Bar, level: f64) -> f64 {
    let range = bar.high - bar.low;
    if bar.close > bar.open {
        let from_top = if range > 0.0 { (bar.high - level) / range } else { 0.0 };
        0.7 - from_top * 0.2
    } else {
        let from_bottom = if range > 0.0 { (level - bar.low) / range } else { 0.5 };
        0.3 + from_bottom * 0.2
    }
}

pub fn volume_profile(bars: &[Bar], config: &SeriesConfig) -> Vec<ProfileLevel> {
    let window = tail(bars, config.profile_lookback);
    if window.is_empty() || config.profile_buckets == 0 {
        return Vec::new();
    }

    let mut lo = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let mut hi = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    if lo >= hi {
        let pad = lo.abs() * 0.005;
        lo -= pad;
        hi += pad;
    }
    if !(lo < hi) {
        return Vec::new();
    }

    let levels = linspace(lo, hi, config.profile_buckets);
    let mut total = vec![0.0; levels.len()];
    let mut buy = vec![0.0; levels.len()];
    let mut sell = vec![0.0; levels.len()];

    for bar in window {
        let mut inside: Vec<usize> = (0..levels.len())
            .filter(|&i| bar.low <= levels[i] && levels[i] <= bar.high)
            .collect();
        if inside.is_empty() {
            // Narrow candle between two levels: credit the nearest one.
            let mid = (bar.high + bar.low) / 2.0;
            if let Some(nearest) = (0..levels.len())
                .min_by(|&a, &b| (levels[a] - mid).abs().total_cmp(&(levels[b] - mid).abs()))
            {
                inside.push(nearest);
            }
        }
        let per_level = bar.volume as f64 / inside.len() as f64;
        for i in inside {
            let ratio = buy_ratio(bar, levels[i]);
            total[i] += per_level;
            buy[i] += per_level * ratio;
            sell[i] += per_level * (1.0 - ratio);
        }
    }

    levels
        .iter()
        .enumerate()
        .map(|(i, &price)| ProfileLevel {
            price: round_dp(price, 2),
            volume: total[i] as u64,
            buy_volume: buy[i] as u64,
            sell_volume: sell[i] as u64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{make_bars, make_bars_with_volume};

    #[test]
    fn conserves_volume() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 7) as f64).collect();
        let bars = make_bars_with_volume(&closes, &vec![10_000; 30]);
        let profile = volume_profile(&bars, &SeriesConfig::default());
        assert_eq!(profile.len(), 20);
        let total: u64 = profile.iter().map(|l| l.volume).sum();
        // Truncation to integers loses at most one unit per level
        assert!(total <= 300_000 && total >= 300_000 - 20);
        assert!(profile.windows(2).all(|w| w[0].price < w[1].price));
    }

    #[test]
    fn bullish_bars_lean_to_buying() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + 2.0 * i as f64).collect();
        let profile = volume_profile(&make_bars(&closes), &SeriesConfig::default());
        let buy: u64 = profile.iter().map(|l| l.buy_volume).sum();
        let sell: u64 = profile.iter().map(|l| l.sell_volume).sum();
        assert!(buy > sell);
    }

    #[test]
    fn degenerate_range_is_widened() {
        let bar = Bar {
            timestamp: chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 50.0,
            high: 50.0,
            low: 50.0,
            close: 50.0,
            volume: 1_000,
        };
        let profile = volume_profile(&[bar], &SeriesConfig::default());
        assert_eq!(profile.len(), 20);
        assert_eq!(profile.first().unwrap().price, 49.75);
        assert_eq!(profile.last().unwrap().price, 50.25);
        let total: u64 = profile.iter().map(|l| l.volume).sum();
        assert_eq!(total, 1_000);
    }
}

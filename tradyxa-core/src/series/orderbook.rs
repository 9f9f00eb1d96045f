//! Synthetic orderbook: a symmetric price ladder around the last close.
//!
//! Ladder step is the last close times recent return volatility (floored at
//! `orderbook_min_step`); quantity decays with depth.

use serde::{Deserialize, Serialize};

use super::{tail, SeriesConfig};
use crate::domain::Bar;
use crate::window::{round_dp, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderbookLevel {
    pub price: f64,
    pub bid_qty: u64,
    pub ask_qty: u64,
}

/// Sample std-dev of the last `window` close-to-close returns.
fn recent_volatility(bars: &[Bar], window: usize) -> f64 {
    let returns: Vec<f64> = tail(bars, window + 1)
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .filter(|r| r.is_finite())
        .collect();
    sample_std(&returns).filter(|s| s.is_finite()).unwrap_or(0.0)
}

/// Bids then asks, sorted by ascending price.
pub fn orderbook(bars: &[Bar], config: &SeriesConfig) -> Vec<OrderbookLevel> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let price = last.close;
    let vol = recent_volatility(bars, config.orderbook_vol_window);
    let step = price * vol.max(config.orderbook_min_step);
    let qty = |depth: usize| {
        (config.orderbook_base_qty / (1.0 + config.orderbook_decay * depth as f64)) as u64
    };

    let levels = config.orderbook_levels;
    let bids = (1..=levels).rev().map(|i| OrderbookLevel {
        price: round_dp(price - i as f64 * step, 2),
        bid_qty: qty(i),
        ask_qty: 0,
    });
    let asks = (1..=levels).map(|i| OrderbookLevel {
        price: round_dp(price + i as f64 * step, 2),
        bid_qty: 0,
        ask_qty: qty(i),
    });
    bids.chain(asks).collect()
}

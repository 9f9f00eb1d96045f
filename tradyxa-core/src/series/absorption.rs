//! Absorption flow: per-bar buy/sell volume split.
//!
//! The side the bar closed toward gets 60% of the volume plus up to 20% more
//! depending on how much of the bar's range the body covers.

use serde::{Deserialize, Serialize};

use super::{date_label, tail};
use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsorptionPoint {
    pub date: String,
    pub buy_flow: u64,
    pub sell_flow: u64,
    pub net_flow: i64,
}

pub fn absorption_flow(bars: &[Bar], max_points: usize) -> Vec<AbsorptionPoint> {
    tail(bars, max_points)
        .iter()
        .map(|bar| {
            let volume = bar.volume as f64;
            let body = bar.close - bar.open;
            let mut range = bar.high - bar.low;
            if range == 0.0 {
                range = 0.01;
            }
            let momentum = (body.abs() / range).min(1.0);
            let dominant = volume * (0.6 + 0.2 * momentum);
            let (buy, sell) = if body > 0.0 {
                (dominant, volume - dominant)
            } else {
                (volume - dominant, dominant)
            };
            let buy_flow = buy.max(0.0) as u64;
            let sell_flow = sell.max(0.0) as u64;
            AbsorptionPoint {
                date: date_label(&bar.timestamp),
                buy_flow,
                sell_flow,
                net_flow: buy_flow as i64 - sell_flow as i64,
            }
        })
        .collect()
}

use serde::{Deserialize, Serialize};

use super::{date_label, tail};
use crate::domain::Bar;
use crate::window::round_dp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// The last `max_candles` bars, prices rounded to 2 decimals.
pub fn candles(bars: &[Bar], max_candles: usize) -> Vec<Candle> {
    tail(bars, max_candles)
        .iter()
        .map(|b| Candle {
            date: date_label(&b.timestamp),
            open: round_dp(b.open, 2),
            high: round_dp(b.high, 2),
            low: round_dp(b.low, 2),
            close: round_dp(b.close, 2),
            volume: b.volume,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::make_bars;

    #[test]
    fn keeps_latest_bars() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 + 0.004).collect();
        let c = candles(&make_bars(&closes), 3);
        assert_eq!(c.len(), 3);
        assert_eq!(c[2].close, 109.0);
        assert_eq!(c[0].date, "2024-01-09");
    }
}

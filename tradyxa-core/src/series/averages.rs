//! Bollinger bands and moving averages of the close.
//!
//! Both use sample standard deviation / plain SMA over trailing windows and
//! report `None` while a window is still filling.

use serde::{Deserialize, Serialize};

use super::{date_label, rolling_opt, tail, SeriesConfig};
use crate::domain::Bar;
use crate::window::{mean, round_dp, sample_std};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    pub date: String,
    pub close: f64,
    pub sma: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingAveragePoint {
    pub date: String,
    pub close: f64,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

fn round2(x: Option<f64>) -> Option<f64> {
    x.map(|v| round_dp(v, 2))
}

/// SMA ± `bollinger_std` sample standard deviations, last `chart_points` bars.
pub fn bollinger_bands(bars: &[Bar], config: &SeriesConfig) -> Vec<BollingerPoint> {
    let window = config.bollinger_window;
    let bars = tail(bars, config.chart_points + window);
    let closes = closes(bars);
    let sma = rolling_opt(&closes, window, mean);
    let sd = rolling_opt(&closes, window, sample_std);

    let start = bars.len().saturating_sub(config.chart_points);
    (start..bars.len())
        .map(|i| {
            let band = sma[i].zip(sd[i]);
            BollingerPoint {
                date: date_label(&bars[i].timestamp),
                close: round_dp(closes[i], 2),
                sma: round2(sma[i]),
                upper: round2(band.map(|(m, s)| m + config.bollinger_std * s)),
                lower: round2(band.map(|(m, s)| m - config.bollinger_std * s)),
            }
        })
        .collect()
}

/// Short, mid and long SMAs of the close, last `chart_points` bars.
pub fn rolling_averages(bars: &[Bar], config: &SeriesConfig) -> Vec<RollingAveragePoint> {
    let [short, mid, long] = config.ma_windows;
    let bars = tail(bars, config.chart_points + long);
    let closes = closes(bars);
    let ma_short = rolling_opt(&closes, short, mean);
    let ma_mid = rolling_opt(&closes, mid, mean);
    let ma_long = rolling_opt(&closes, long, mean);

    let start = bars.len().saturating_sub(config.chart_points);
    (start..bars.len())
        .map(|i| RollingAveragePoint {
            date: date_label(&bars[i].timestamp),
            close: round_dp(closes[i], 2),
            ma5: round2(ma_short[i]),
            ma20: round2(ma_mid[i]),
            ma50: round2(ma_long[i]),
        })
        .collect()
}

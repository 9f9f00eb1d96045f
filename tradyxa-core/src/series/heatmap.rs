//! Intraday activity heatmap.
//!
//! Daily bars carry no intraday detail, so the grid is a seeded template:
//! a typical hour-of-day shape times a weekday shape times ±20% jitter.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SeriesConfig;
use crate::rng::{SeedHierarchy, Stream};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub hour: u32,
    /// 0 = Monday.
    pub day_of_week: u32,
    pub value: i64,
    pub count: u64,
}

/// One cell per (weekday, hour), weekdays outermost.
pub fn heatmap(config: &SeriesConfig, instrument: &str, seeds: &SeedHierarchy) -> Vec<HeatmapCell> {
    let mut rng = seeds.rng_for(instrument, Stream::Heatmap, 0);
    let mut cells =
        Vec::with_capacity(config.heatmap_day_pattern.len() * config.heatmap_hour_pattern.len());

    for (day, day_weight) in config.heatmap_day_pattern.iter().enumerate() {
        for (hour, hour_weight) in config.heatmap_hour_pattern.iter().enumerate() {
            let jitter = 0.8 + rng.gen::<f64>() * 0.4;
            let intensity = hour_weight * day_weight * jitter;
            cells.push(HeatmapCell {
                hour: config.heatmap_first_hour + hour as u32,
                day_of_week: day as u32,
                value: (intensity * 100.0).round() as i64,
                count: (5000.0 + intensity * 5000.0) as u64,
            });
        }
    }
    cells
}

//! Canonical ordering for bar series: ascending, unique timestamps, no void bars.

use crate::domain::Bar;

/// Sort ascending by timestamp and drop duplicates, keeping the **last**
/// occurrence of each timestamp in input order. Void bars (non-finite OHLC)
/// are dropped.
pub fn canonicalize(bars: Vec<Bar>) -> Vec<Bar> {
    let mut indexed: Vec<(usize, Bar)> = bars
        .into_iter()
        .filter(|b| !b.is_void())
        .enumerate()
        .collect();
    // Stable sort on (timestamp, arrival) so the later arrival ends up last.
    indexed.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then(a.0.cmp(&b.0)));

    let mut out: Vec<Bar> = Vec::with_capacity(indexed.len());
    for (_, bar) in indexed {
        match out.last_mut() {
            Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Merge `newer` into `existing`, newer values winning on timestamp conflicts.
pub fn merge(existing: Vec<Bar>, newer: Vec<Bar>) -> Vec<Bar> {
    let mut all = existing;
    all.extend(newer);
    canonicalize(all)
}

/// True if the series is strictly ascending by timestamp.
pub fn is_canonical(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}

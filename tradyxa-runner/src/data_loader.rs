//! Bar loading and data resolution for the runner.
//!
//! Resolves one instrument's OHLCV history through the fallback policy:
//! 1. Cached CSV exists and is fresh → use it
//! 2. Provider available (and not offline) → fetch the missing range, merge,
//!    write back to the cache
//! 3. Synthetic fallback enabled → generate synthetic bars (tagged)
//! 4. Otherwise → fail with a clear error
//!
//! Data whose last bar is more than `max_staleness_days` before the as-of
//! date counts as unavailable.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::Rng;
use rand_distr::StandardNormal;
use thiserror::Error;
use tracing::{debug, info, warn};
use tradyxa_core::data::{merge, CacheError, CsvCache, DataError, DataProvider, DataSource};
use tradyxa_core::domain::Bar;
use tradyxa_core::rng::{SeedHierarchy, Stream};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no usable data for '{symbol}' and no network access (enable synthetic fallback to continue)")]
    NoUsableDataOffline { symbol: String },

    #[error("no usable data for '{symbol}' and download failed: {reason}")]
    DownloadFailed { symbol: String, reason: String },

    #[error("data for '{symbol}' is stale: last bar {last} is {days_old} days old")]
    Stale {
        symbol: String,
        last: NaiveDate,
        days_old: i64,
    },

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Date the data must be fresh relative to (normally today).
    pub as_of: NaiveDate,
    pub max_staleness_days: i64,
    /// Span requested from the provider when nothing is cached.
    pub history_days: i64,
    /// Never call the provider.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Skip the cache and the provider entirely.
    pub synthetic_only: bool,
}

impl LoadOptions {
    pub fn from_config(config: &DataConfig, as_of: NaiveDate) -> Self {
        Self {
            as_of,
            max_staleness_days: config.max_staleness_days,
            history_days: config.history_days,
            offline: config.offline,
            synthetic: config.synthetic_fallback,
            synthetic_only: false,
        }
    }
}

/// Bars for one instrument plus their provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

/// Days between the last bar and `as_of`, or `None` for an empty series.
pub fn days_old(bars: &[Bar], as_of: NaiveDate) -> Option<i64> {
    bars.last()
        .map(|b| (as_of - b.timestamp.date()).num_days())
}

fn is_fresh(bars: &[Bar], opts: &LoadOptions) -> bool {
    days_old(bars, opts.as_of).is_some_and(|d| d <= opts.max_staleness_days)
}

/// Load bars for a symbol from the cache, with fallback to download or synthetic.
pub fn load_bars(
    symbol: &str,
    cache: &CsvCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
    seeds: &SeedHierarchy,
) -> Result<LoadedBars, LoadError> {
    if opts.synthetic_only {
        return Ok(synthetic(symbol, opts, seeds));
    }

    // Step 1: cache
    let cached = match cache.load(symbol) {
        Ok(bars) => bars,
        Err(CacheError::NotCached { .. } | CacheError::Empty { .. }) => Vec::new(),
        Err(e) => {
            warn!(symbol, error = %e, "unreadable cache file, ignoring");
            Vec::new()
        }
    };
    if is_fresh(&cached, opts) {
        debug!(symbol, bars = cached.len(), "loaded from cache");
        return Ok(LoadedBars {
            symbol: symbol.to_string(),
            bars: cached,
            source: DataSource::Cache,
        });
    }

    // Step 2: provider, fetching only what the cache lacks
    let mut best = cached;
    let mut failure: Option<String> = None;
    if !opts.offline {
        if let Some(prov) = provider.filter(|p| p.is_available()) {
            let start = best
                .last()
                .map(|b| b.timestamp.date() + Duration::days(1))
                .unwrap_or(opts.as_of - Duration::days(opts.history_days));
            if start <= opts.as_of {
                match prov.fetch(symbol, start, opts.as_of) {
                    Ok(fetched) => {
                        info!(symbol, provider = prov.name(), bars = fetched.bars.len(), "fetched bars");
                        best = merge(best, fetched.bars);
                        if let Err(e) = cache.write(symbol, &best) {
                            warn!(symbol, error = %e, "failed to update cache");
                        }
                        if is_fresh(&best, opts) {
                            return Ok(LoadedBars {
                                symbol: symbol.to_string(),
                                bars: best,
                                source: DataSource::Provider,
                            });
                        }
                    }
                    Err(e) => {
                        warn!(symbol, provider = prov.name(), error = %e, "fetch failed");
                        failure = Some(e.to_string());
                    }
                }
            }
        }
    }

    if let Some(d) = days_old(&best, opts.as_of) {
        warn!(symbol, days_old = d, "data is stale");
    }

    // Step 3: synthetic
    if opts.synthetic {
        return Ok(synthetic(symbol, opts, seeds));
    }

    // Step 4: fail
    if let (Some(last), Some(d)) = (best.last(), days_old(&best, opts.as_of)) {
        return Err(LoadError::Stale {
            symbol: symbol.to_string(),
            last: last.timestamp.date(),
            days_old: d,
        });
    }
    if opts.offline || provider.is_none() {
        return Err(LoadError::NoUsableDataOffline {
            symbol: symbol.to_string(),
        });
    }
    Err(LoadError::DownloadFailed {
        symbol: symbol.to_string(),
        reason: failure.unwrap_or_else(|| "provider unavailable".into()),
    })
}

fn synthetic(symbol: &str, opts: &LoadOptions, seeds: &SeedHierarchy) -> LoadedBars {
    warn!(symbol, "generating synthetic data; results will be tagged as synthetic");
    LoadedBars {
        symbol: symbol.to_string(),
        bars: generate_synthetic_bars(symbol, opts.as_of, seeds),
        source: DataSource::Synthetic,
    }
}

// ─── Synthetic series ────────────────────────────────────────────────

/// Bars in a synthetic series.
pub const SYNTHETIC_BARS: usize = 200;
/// First synthetic price.
pub const SYNTHETIC_START_PRICE: f64 = 20_000.0;

/// Last `n` business days ending on or before `end`, ascending.
fn business_days(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut d = end;
    while days.len() < n {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(d);
        }
        d -= Duration::days(1);
    }
    days.reverse();
    days
}

/// Intraday volume shape peaking at 13:00.
fn volume_shape(hour: f64) -> f64 {
    (-(hour - 13.0).powi(2) / 18.0).exp()
}

/// Generate a deterministic synthetic OHLCV series for `symbol`.
///
/// 200 business-day bars stamped 15:30 ending at `as_of`. Prices follow a
/// compounded random walk from 20,000 whose daily return is the sum of a
/// drift draw N(0.0005, 0.01) and a shock draw N(0, 0.015). Highs and lows
/// sit |N(0, 0.008)| away from the close; opens are the previous close.
pub fn generate_synthetic_bars(symbol: &str, as_of: NaiveDate, seeds: &SeedHierarchy) -> Vec<Bar> {
    let mut rng = seeds.rng_for(symbol, Stream::Synthetic, 0);
    let mut normal = |mean: f64, sd: f64| -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        mean + sd * z
    };

    let days = business_days(as_of, SYNTHETIC_BARS);
    let returns: Vec<f64> = (0..days.len())
        .map(|_| normal(0.0005, 0.01) + normal(0.0, 0.015))
        .collect();
    let wicks: Vec<(f64, f64)> = (0..days.len())
        .map(|_| (normal(0.0, 0.008).abs(), normal(0.0, 0.008).abs()))
        .collect();

    let mut bars = Vec::with_capacity(days.len());
    let mut price = SYNTHETIC_START_PRICE;
    let mut prev_close: Option<f64> = None;
    for ((day, r), (up, down)) in days.into_iter().zip(returns).zip(wicks) {
        price *= 1.0 + r;
        let timestamp = synthetic_timestamp(day);
        let hour = 15.5;
        let open = prev_close.unwrap_or(price);
        let noise: f64 = rng.gen();
        let volume = (1e6 * volume_shape(hour) * (0.5 + noise)) as u64;
        bars.push(Bar {
            timestamp,
            open,
            high: (price * (1.0 + up)).max(open),
            low: (price * (1.0 - down)).min(open),
            close: price,
            volume,
        });
        prev_close = Some(price);
    }
    bars
}

fn synthetic_timestamp(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(15, 30, 0).unwrap_or_else(|| day.and_time(chrono::NaiveTime::MIN))
}

//! Criterion benchmarks for the engine hot paths.
//!
//! Benchmarks:
//! 1. Feature extraction over growing series
//! 2. Deterministic and Monte Carlo slippage simulation
//! 3. Verdict aggregation
//! 4. Derived-series generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradyxa_core::domain::Bar;
use tradyxa_core::features::{compute_features, FeatureConfig, MarketMetrics};
use tradyxa_core::rng::SeedHierarchy;
use tradyxa_core::series::{DerivedSeries, SeriesConfig};
use tradyxa_core::slippage::{
    simulate_all, simulate_deterministic, simulate_monte_carlo, SlippageConfig,
};
use tradyxa_core::verdict::{compute_verdict, VerdictInputs, VerdictParams};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

// ── 1. Features ──────────────────────────────────────────────────────

fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");
    let config = FeatureConfig::default();
    for bar_count in [252usize, 1260, 5000] {
        let bars = make_bars(bar_count);
        group.bench_with_input(
            BenchmarkId::new("compute_features", bar_count),
            &bars,
            |b, bars| b.iter(|| compute_features(black_box(bars), &config)),
        );
    }
    group.finish();
}

// ── 2. Slippage ──────────────────────────────────────────────────────

fn bench_slippage(c: &mut Criterion) {
    let mut group = c.benchmark_group("slippage");
    let rows = compute_features(&make_bars(1260), &FeatureConfig::default());
    let config = SlippageConfig::default();
    let seeds = SeedHierarchy::default();

    group.bench_function("deterministic_1260_bars", |b| {
        b.iter(|| simulate_deterministic(black_box(&rows), 250_000.0, &config, "BENCH", &seeds))
    });
    group.bench_function("monte_carlo_400_trials", |b| {
        b.iter(|| simulate_monte_carlo(black_box(&rows), 250_000.0, &config, "BENCH", &seeds))
    });
    group.bench_function("all_notionals", |b| {
        b.iter(|| simulate_all(black_box(&rows), &config, "BENCH", &seeds))
    });
    group.finish();
}

// ── 3. Verdict ───────────────────────────────────────────────────────

fn bench_verdict(c: &mut Criterion) {
    let rows = compute_features(&make_bars(1260), &FeatureConfig::default());
    let metrics = MarketMetrics::from_features(&rows, 15.0);
    let (det, mc) = simulate_all(&rows, &SlippageConfig::default(), "BENCH", &SeedHierarchy::default());
    let params = VerdictParams::default();

    c.bench_function("verdict", |b| {
        b.iter(|| {
            let inputs = VerdictInputs {
                metrics: &metrics,
                features: &rows,
                slippage: &det,
                monte_carlo: Some(&mc),
                ml_regime: Some(1),
            };
            compute_verdict(black_box(&inputs), &params)
        })
    });
}

// ── 4. Derived series ────────────────────────────────────────────────

fn bench_series(c: &mut Criterion) {
    let bars = make_bars(1260);
    let config = SeriesConfig::default();
    let seeds = SeedHierarchy::default();
    c.bench_function("derived_series_1260_bars", |b| {
        b.iter(|| DerivedSeries::generate(black_box(&bars), &config, "BENCH", &seeds))
    });
}

criterion_group!(benches, bench_features, bench_slippage, bench_verdict, bench_series);
criterion_main!(benches);

//! End-to-end engine scenarios: bars → features → slippage → verdict → series.

use chrono::{Duration, NaiveDate};
use tradyxa_core::domain::Bar;
use tradyxa_core::features::{compute_features, FeatureRow, MarketMetrics};
use tradyxa_core::series::DerivedSeries;
use tradyxa_core::slippage::{
    simulate_all, simulate_deterministic, simulate_monte_carlo, SlippageTable,
};
use tradyxa_core::verdict::{
    compute_verdict, compute_verdict_or_neutral, DataQuality, Direction, Verdict, VerdictInputs,
};
use tradyxa_core::EngineConfig;

fn bars(closes: &[f64], volumes: &[u64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + Duration::days(i as i64),
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume,
            }
        })
        .collect()
}

struct Run {
    rows: Vec<FeatureRow>,
    det: SlippageTable,
    mc: SlippageTable,
    verdict: Verdict,
}

fn run(bars: &[Bar], config: &EngineConfig) -> Run {
    let rows = compute_features(bars, &config.features);
    let metrics = MarketMetrics::from_features(&rows, config.vix_level);
    let (det, mc) = simulate_all(&rows, &config.slippage, "ENGINE", &config.seeds());
    let verdict = compute_verdict(
        &VerdictInputs {
            metrics: &metrics,
            features: &rows,
            slippage: &det,
            monte_carlo: Some(&mc),
            ml_regime: None,
        },
        &config.verdict,
    )
    .expect("finite inputs");
    Run {
        rows,
        det,
        mc,
        verdict,
    }
}

#[test]
fn flat_series_is_neutral_with_low_confidence() {
    let config = EngineConfig::default();
    let r = run(&bars(&[250.0; 25], &[2_000; 25]), &config);

    for row in &r.rows {
        assert_eq!(row.ret, 0.0);
        assert_eq!(row.volatility, 0.0);
        assert_eq!(row.amihud, 0.0);
    }
    assert_eq!(r.verdict.direction, Direction::Neutral);
    assert_eq!(r.verdict.components.momentum, 0.0);
    assert!(r.verdict.confidence < 0.5);
}

#[test]
fn rising_series_is_up() {
    let config = EngineConfig::default();
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let volumes: Vec<u64> = (0..30).map(|i| 1_000 + 10 * i as u64).collect();
    let r = run(&bars(&closes, &volumes), &config);

    let last = r.rows.last().unwrap();
    assert!(last.coordinated_flow > 0.0);
    assert!(r.verdict.components.momentum > 0.0);
    assert_eq!(r.verdict.direction, Direction::Up);
    assert!(r.verdict.points <= 129.0 * 0.05);
    assert_eq!(r.verdict.n_samples.slippage, 30);
    assert_eq!(r.verdict.n_samples.monte, 400);
    assert_eq!(r.verdict.n_samples.features, 30);
    assert_eq!(r.det.len(), 4);
    assert_eq!(r.mc.len(), 4);
}

#[test]
fn zero_notional_costs_nothing_on_a_quiet_series() {
    let config = EngineConfig::default();
    let seeds = config.seeds();
    let rows = compute_features(&bars(&[80.0; 40], &[5_000; 40]), &config.features);

    let det = simulate_deterministic(&rows, 0.0, &config.slippage, "Q", &seeds);
    let mc = simulate_monte_carlo(&rows, 0.0, &config.slippage, "Q", &seeds);
    assert!(det.sample.iter().all(|x| x.abs() < 1e-12));
    assert!(mc.sample.iter().all(|x| x.abs() < 1e-12));
}

#[test]
fn zero_notional_stays_near_zero_with_noise() {
    let config = EngineConfig::default();
    let seeds = config.seeds();
    let closes: Vec<f64> = (0..60)
        .map(|i| 100.0 * (1.0 + 0.01 * ((i * 7 % 11) as f64 - 5.0) / 5.0))
        .collect();
    let rows = compute_features(&bars(&closes, &vec![10_000; 60]), &config.features);

    let det = simulate_deterministic(&rows, 0.0, &config.slippage, "N", &seeds);
    // Noise is N(0, 0.5·σ) clamped at 0; σ of these returns is a few percent at most.
    assert!(det.median < 0.02);
    assert!(det.sample.iter().all(|x| *x < 0.2));
}

#[test]
fn all_zero_volume_series() {
    let config = EngineConfig::default();
    let bars = bars(&[120.0; 20], &[0; 20]);
    let rows = compute_features(&bars, &config.features);

    assert!(rows.iter().all(|r| r.amihud == 0.0));
    assert!(rows.iter().all(|r| r.mfc.is_finite()));

    let det = simulate_deterministic(&rows, 100_000.0, &config.slippage, "Z", &config.seeds());
    assert!(det.low_data);

    let r = run(&bars, &config);
    assert!((0.0..=1.0).contains(&r.verdict.confidence));
    assert_eq!(r.verdict.data_quality, DataQuality::Low);
}

#[test]
fn empty_series_produces_a_verdict() {
    let config = EngineConfig::default();
    let r = run(&[], &config);
    assert!(r.rows.is_empty());
    assert_eq!(r.verdict.data_quality, DataQuality::Insufficient);
    assert_eq!(r.verdict.points, 0.0);
    assert!((0.0..=1.0).contains(&r.verdict.confidence));
}

#[test]
fn fallback_on_failure() {
    let config = EngineConfig::default();
    let rows = compute_features(&bars(&[10.0; 30], &[100; 30]), &config.features);
    let mut metrics = MarketMetrics::from_features(&rows, config.vix_level);
    metrics.vix_latest = f64::INFINITY;
    let (det, _) = simulate_all(&rows, &config.slippage, "F", &config.seeds());
    let inputs = VerdictInputs {
        metrics: &metrics,
        features: &rows,
        slippage: &det,
        monte_carlo: None,
        ml_regime: None,
    };
    assert!(compute_verdict(&inputs, &config.verdict).is_err());
    let v = compute_verdict_or_neutral(&inputs, &config.verdict);
    assert_eq!(v.direction, Direction::Neutral);
    assert_eq!(v.confidence, 0.0);
    assert_eq!(v.data_quality, DataQuality::Insufficient);
}

#[test]
fn whole_run_is_reproducible() {
    let config = EngineConfig::default();
    let closes: Vec<f64> = (0..150)
        .map(|i| 1_000.0 + (i as f64 / 9.0).sin() * 40.0 + i as f64 * 0.3)
        .collect();
    let volumes: Vec<u64> = (0..150).map(|i| 20_000 + (i as u64 * 7_919) % 9_000).collect();
    let bars = bars(&closes, &volumes);

    let a = run(&bars, &config);
    let b = run(&bars, &config);
    assert_eq!(a.det, b.det);
    assert_eq!(a.mc, b.mc);
    assert_eq!(a.verdict, b.verdict);

    let sa = DerivedSeries::generate(&bars, &config.series, "ENGINE", &config.seeds());
    let sb = DerivedSeries::generate(&bars, &config.series, "ENGINE", &config.seeds());
    assert_eq!(sa, sb);
}

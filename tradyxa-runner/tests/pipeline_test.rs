//! End-to-end pipeline runs against a temporary output directory.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::fs;
use std::path::Path;
use tradyxa_core::data::{CsvCache, DataSource};
use tradyxa_core::domain::Bar;
use tradyxa_core::verdict::Verdict;
use tradyxa_runner::{
    run_batch, MlPrediction, MlPredictions, Pipeline, PipelineConfig, PipelineError, LoadError,
};

fn config(root: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.data.raw_dir = root.join("raw");
    config.output.dir = root.join("out");
    config
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn bars_ending(last: NaiveDate, n: i64) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let close = 1_000.0 + (i as f64 / 5.0).sin() * 20.0 + i as f64;
            Bar {
                timestamp: (last - Duration::days(n - 1 - i)).and_hms_opt(0, 0, 0).unwrap(),
                open: close - 2.0,
                high: close + 5.0,
                low: close - 7.0,
                close,
                volume: 50_000 + (i as u64 * 977) % 20_000,
            }
        })
        .collect()
}

// ── 1. Synthetic run ──

#[test]
fn synthetic_run_writes_all_documents() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(dir.path())).synthetic_only(true);
    let now = Utc.with_ymd_and_hms(2024, 6, 14, 12, 0, 0).unwrap();

    let report = pipeline.run_at("NIFTY", now).unwrap();
    assert_eq!(report.symbol, "^NSEI");
    assert_eq!(report.friendly_name.as_deref(), Some("NIFTY"));
    assert_eq!(report.source, DataSource::Synthetic);
    assert_eq!(report.bars, 200);
    assert_eq!(report.files.len(), 6);

    let out = dir.path().join("out");
    let snap = read_json(&out.join("^NSEI.json"));
    assert_eq!(snap["meta"]["ticker"], "^NSEI");
    assert_eq!(snap["meta"]["data_source"], "synthetic");
    assert_eq!(snap["meta"]["last_updated"], "2024-06-14T12:00:00+00:00");
    assert_eq!(snap["features_head"].as_object().unwrap().len(), 200);
    assert!(snap["features_head"].get("2024-06-14T15:30:00").is_some());
    assert_eq!(snap["candles"].as_array().unwrap().len(), 60);
    assert_eq!(snap["orderbook"].as_array().unwrap().len(), 20);
    for key in [
        "volumeProfile",
        "bollingerBands",
        "rollingAverages",
        "absorptionFlow",
        "heatmap",
        "histogram",
        "slippageSamples",
    ] {
        assert!(snap[key].is_array(), "missing {key}");
    }
    let verdict = &snap["metrics"]["verdict"];
    assert!(["UP", "DOWN", "NEUTRAL"].contains(&verdict["direction"].as_str().unwrap()));
    assert_eq!(verdict["version"], "verdict_v1");
    assert_eq!(snap["metrics"]["vix_latest"], 15.0);

    let slip = read_json(&out.join("^NSEI_slippage.json"));
    for key in ["100000", "250000", "500000", "1000000"] {
        assert_eq!(slip[key]["sample"].as_array().unwrap().len(), 200);
    }
    let monte = read_json(&out.join("^NSEI_monte_slippage.json"));
    assert_eq!(monte["100000"]["sample"].as_array().unwrap().len(), 400);

    // Friendly copy differs only in meta.ticker
    let copy = read_json(&out.join("NIFTY.json"));
    assert_eq!(copy["meta"]["ticker"], "NIFTY");
    assert_eq!(copy["metrics"], snap["metrics"]);
    assert_eq!(read_json(&out.join("NIFTY_slippage.json")), slip);
    assert!(out.join("NIFTY_monte_slippage.json").exists());
}

#[test]
fn equity_gets_suffix_and_friendly_copy() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(dir.path())).synthetic_only(true);
    let report = pipeline.run("AXISBANK").unwrap();
    assert_eq!(report.symbol, "AXISBANK.NS");
    let out = dir.path().join("out");
    assert!(out.join("AXISBANK.NS.json").exists());
    assert_eq!(read_json(&out.join("AXISBANK.json"))["meta"]["ticker"], "AXISBANK");
}

#[test]
fn friendly_copies_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.output.friendly_copies = false;
    let report = Pipeline::new(cfg).synthetic_only(true).run("TCS").unwrap();
    assert!(report.friendly_name.is_none());
    assert_eq!(report.files.len(), 3);
    assert!(!dir.path().join("out").join("TCS.json").exists());
}

#[test]
fn reruns_are_identical_apart_from_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(dir.path())).synthetic_only(true);
    let now = Utc.with_ymd_and_hms(2024, 6, 14, 12, 0, 0).unwrap();
    let path = dir.path().join("out").join("^NSEBANK.json");

    pipeline.run_at("BANKNIFTY", now).unwrap();
    let first = read_json(&path);
    pipeline.run_at("BANKNIFTY", now).unwrap();
    assert_eq!(read_json(&path), first);
}

#[test]
fn unvalidated_verdict_bounds_publish_neutral_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.engine.verdict.vol_scale_min = 3.0;
    cfg.engine.verdict.vol_scale_max = 0.2;
    let pipeline = Pipeline::new(cfg).synthetic_only(true);

    let tickers = vec!["NIFTY".to_string(), "TCS".to_string()];
    let summary = run_batch(&pipeline, &tickers, 2).unwrap();
    assert_eq!(summary.success_count(), 2);
    for report in &summary.succeeded {
        assert_eq!(report.verdict, Verdict::neutral_fallback());
    }
    let snap = read_json(&dir.path().join("out").join("^NSEI.json"));
    assert_eq!(snap["metrics"]["verdict"]["direction"], "NEUTRAL");
}

// ── 2. Cached data ──

#[test]
fn fresh_cache_feeds_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.data.offline = true;
    cfg.data.synthetic_fallback = false;
    cfg.output.history_rows = 50;
    let now = Utc.with_ymd_and_hms(2024, 6, 14, 18, 0, 0).unwrap();
    CsvCache::new(&cfg.data.raw_dir)
        .write("INFY.NS", &bars_ending(now.date_naive(), 120))
        .unwrap();

    let report = Pipeline::new(cfg).run_at("INFY", now).unwrap();
    assert_eq!(report.source, DataSource::Cache);
    assert_eq!(report.bars, 120);

    let snap = read_json(&dir.path().join("out").join("INFY.NS.json"));
    assert_eq!(snap["meta"]["data_source"], "cache");
    assert_eq!(snap["features_head"].as_object().unwrap().len(), 50);
    let last = &snap["features_head"]["2024-06-14T00:00:00"];
    assert_eq!(last["Volume"], 50_000 + (119 * 977) % 20_000);
    assert_eq!(last["tod"], 0.0);
}

#[test]
fn stale_cache_without_fallback_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.data.offline = true;
    cfg.data.synthetic_fallback = false;
    let now = Utc.with_ymd_and_hms(2024, 6, 14, 18, 0, 0).unwrap();
    CsvCache::new(&cfg.data.raw_dir)
        .write("INFY.NS", &bars_ending(now.date_naive() - Duration::days(30), 60))
        .unwrap();

    let err = Pipeline::new(cfg).run_at("INFY", now).unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::Stale { days_old: 30, .. })));
    assert!(!dir.path().join("out").join("INFY.NS.json").exists());
}

#[test]
fn stale_cache_falls_back_to_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.data.offline = true;
    let now = Utc.with_ymd_and_hms(2024, 6, 14, 18, 0, 0).unwrap();
    CsvCache::new(&cfg.data.raw_dir)
        .write("INFY.NS", &bars_ending(now.date_naive() - Duration::days(30), 60))
        .unwrap();

    let report = Pipeline::new(cfg).run_at("INFY", now).unwrap();
    assert_eq!(report.source, DataSource::Synthetic);
}

// ── 3. Model outputs ──

#[test]
fn predictions_are_published() {
    let dir = tempfile::tempdir().unwrap();
    let mut preds = MlPredictions::default();
    preds.insert(
        "NIFTY",
        MlPrediction {
            regime_label: Some(2),
            regime_prob: vec![0.1, 0.2, 0.6, 0.1],
            predicted_median: Some(0.003),
            predicted_p90: Some(0.008),
        },
    );
    let pipeline = Pipeline::new(config(dir.path()))
        .synthetic_only(true)
        .with_predictions(preds);
    let report = pipeline.run("NIFTY").unwrap();
    assert!(report.verdict.ml_enhanced);

    let out = dir.path().join("out");
    let snap = read_json(&out.join("^NSEI.json"));
    assert_eq!(snap["metrics"]["ml_regime_label"], 2);
    assert_eq!(snap["metrics"]["ml_regime_prob"].as_array().unwrap().len(), 4);
    let slip = read_json(&out.join("^NSEI_slippage.json"));
    assert_eq!(slip["100000"]["predicted_median"], 0.003);
    assert!(slip["250000"].get("predicted_median").is_none());
}

// ── 4. Batch ──

#[test]
fn batch_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.data.offline = true;
    cfg.data.synthetic_fallback = false;
    let today = Utc::now().date_naive();
    let cache = CsvCache::new(&cfg.data.raw_dir);
    cache.write("TCS.NS", &bars_ending(today, 80)).unwrap();
    cache.write("^NSEI", &bars_ending(today, 80)).unwrap();

    let pipeline = Pipeline::new(cfg);
    let tickers: Vec<String> = ["TCS", "MISSING", "NIFTY"].iter().map(|s| s.to_string()).collect();
    let summary = run_batch(&pipeline, &tickers, 2).unwrap();

    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.error_count(), 1);
    assert_eq!(summary.failed_tickers(), vec!["MISSING"]);
    assert!(matches!(
        summary.failed[0].error,
        PipelineError::Load(LoadError::NoUsableDataOffline { .. })
    ));
    // Input order is kept
    assert_eq!(summary.succeeded[0].symbol, "TCS.NS");
    assert_eq!(summary.succeeded[1].symbol, "^NSEI");
    let out = dir.path().join("out");
    assert!(out.join("TCS.json").exists());
    assert!(out.join("NIFTY.json").exists());
}

#[test]
fn batch_single_worker() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(dir.path())).synthetic_only(true);
    let tickers = vec!["A".to_string(), "B".to_string(), "C".to_string()];
    let summary = run_batch(&pipeline, &tickers, 1).unwrap();
    assert_eq!(summary.success_count(), 3);
    assert_eq!(summary.error_count(), 0);
}

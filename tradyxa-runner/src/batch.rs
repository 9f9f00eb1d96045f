//! Parallel batch runs.
//!
//! Runs the pipeline over a list of tickers on a bounded rayon pool. Each
//! instrument is independent: a failure is logged and recorded in the
//! summary, and the rest of the batch carries on.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::Path;
use tracing::{error, info};

use crate::pipeline::{InstrumentReport, Pipeline, PipelineError};

/// Read a tickers file: one ticker per line, surrounding whitespace
/// stripped, blank lines skipped.
pub fn read_tickers(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tickers file {}", path.display()))?;
    Ok(parse_tickers(&text))
}

pub fn parse_tickers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-instrument failure.
#[derive(Debug)]
pub struct BatchFailure {
    pub ticker: String,
    pub error: PipelineError,
}

/// Outcome of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<InstrumentReport>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSummary {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn error_count(&self) -> usize {
        self.failed.len()
    }

    pub fn failed_tickers(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.ticker.as_str()).collect()
    }
}

/// Run every ticker on a pool of `max_workers` threads.
pub fn run_batch(pipeline: &Pipeline, tickers: &[String], max_workers: usize) -> Result<BatchSummary> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()
        .context("failed to build batch thread pool")?;

    info!(tickers = tickers.len(), workers = max_workers, "starting batch");
    let results: Vec<(String, Result<InstrumentReport, PipelineError>)> = pool.install(|| {
        tickers
            .par_iter()
            .map(|ticker| (ticker.clone(), pipeline.run(ticker)))
            .collect()
    });

    let mut summary = BatchSummary::default();
    for (ticker, result) in results {
        match result {
            Ok(report) => summary.succeeded.push(report),
            Err(e) => {
                error!(ticker = %ticker, error = %e, "instrument failed");
                summary.failed.push(BatchFailure { ticker, error: e });
            }
        }
    }
    info!(
        succeeded = summary.success_count(),
        failed = summary.error_count(),
        "batch complete"
    );
    Ok(summary)
}

//! Tradyxa Runner — per-instrument pipeline, snapshot export, batch runs.
//!
//! This crate builds on `tradyxa-core` to provide:
//! - Bar loading with cache/provider/synthetic fallback and staleness checks
//! - The per-instrument pipeline and its snapshot document
//! - Atomic JSON export with friendly-name copies
//! - Precomputed model outputs (regime, slippage quantiles)
//! - Parallel batch runs on a bounded thread pool

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod ml;
pub mod pipeline;
pub mod snapshot;

pub use batch::{parse_tickers, read_tickers, run_batch, BatchFailure, BatchSummary};
pub use config::{BatchConfig, ConfigError, DataConfig, MlConfig, OutputConfig, PipelineConfig};
pub use data_loader::{generate_synthetic_bars, load_bars, LoadError, LoadOptions, LoadedBars};
pub use export::{write_json_atomic, ExportError, SnapshotWriter};
pub use ml::{MlError, MlPrediction, MlPredictions};
pub use pipeline::{analyze, Analysis, InstrumentReport, Pipeline, PipelineError};
pub use snapshot::{FeatureRecord, Meta, Snapshot, SnapshotMetrics};

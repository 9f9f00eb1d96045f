//! Per-instrument pipeline.
//!
//! load bars → features → metrics → slippage (both simulators) → model
//! outputs → verdict → derived series → snapshot files (plus a copy under
//! the instrument's friendly name).
//!
//! A `Pipeline` holds no mutable state, so one instance is shared by every
//! batch worker.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};
use tradyxa_core::data::{CsvCache, DataProvider, DataSource};
use tradyxa_core::domain::Bar;
use tradyxa_core::features::{compute_features, FeatureRow, MarketMetrics};
use tradyxa_core::series::DerivedSeries;
use tradyxa_core::slippage::{simulate_all, SlippageTable};
use tradyxa_core::verdict::{compute_verdict_or_neutral, Verdict, VerdictInputs};
use tradyxa_core::EngineConfig;

use crate::config::PipelineConfig;
use crate::data_loader::{load_bars, LoadError, LoadOptions};
use crate::export::{ExportError, SnapshotWriter};
use crate::ml::{MlPrediction, MlPredictions};
use crate::snapshot::{features_head, Meta, Snapshot, SnapshotMetrics};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("no bars available for '{0}'")]
    NoBars(String),
}

/// Engine outputs for one instrument, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub rows: Vec<FeatureRow>,
    pub metrics: MarketMetrics,
    pub deterministic: SlippageTable,
    pub monte_carlo: SlippageTable,
    pub verdict: Verdict,
    pub series: DerivedSeries,
}

/// Run the engine over a canonical bar series.
///
/// `instrument` keys every random stream, so the same bars analyzed under
/// the same key and seed give identical output.
pub fn analyze(
    instrument: &str,
    bars: &[Bar],
    engine: &EngineConfig,
    ml: Option<&MlPrediction>,
) -> Analysis {
    let seeds = engine.seeds();
    let rows = compute_features(bars, &engine.features);
    let metrics = MarketMetrics::from_features(&rows, engine.vix_level);
    let (mut deterministic, monte_carlo) = simulate_all(&rows, &engine.slippage, instrument, &seeds);
    if let Some(pred) = ml {
        pred.apply_to(&mut deterministic);
    }

    let verdict = compute_verdict_or_neutral(
        &VerdictInputs {
            metrics: &metrics,
            features: &rows,
            slippage: &deterministic,
            monte_carlo: Some(&monte_carlo),
            ml_regime: ml.and_then(|p| p.regime_label),
        },
        &engine.verdict,
    );
    let series = DerivedSeries::generate(bars, &engine.series, instrument, &seeds);

    Analysis {
        rows,
        metrics,
        deterministic,
        monte_carlo,
        verdict,
        series,
    }
}

/// Outcome of one successful instrument run.
#[derive(Debug, Clone)]
pub struct InstrumentReport {
    /// Data-source symbol the files are named after.
    pub symbol: String,
    /// Friendly name the copies were written under, if any.
    pub friendly_name: Option<String>,
    pub source: DataSource,
    pub bars: usize,
    pub verdict: Verdict,
    pub files: Vec<PathBuf>,
}

/// Configured pipeline: cache, optional provider, optional model outputs.
pub struct Pipeline {
    config: PipelineConfig,
    cache: CsvCache,
    provider: Option<Box<dyn DataProvider>>,
    predictions: MlPredictions,
    writer: SnapshotWriter,
    synthetic_only: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            cache: CsvCache::new(&config.data.raw_dir),
            writer: SnapshotWriter::new(&config.output.dir),
            config,
            provider: None,
            predictions: MlPredictions::default(),
            synthetic_only: false,
        }
    }

    pub fn with_provider(mut self, provider: Box<dyn DataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_predictions(mut self, predictions: MlPredictions) -> Self {
        self.predictions = predictions;
        self
    }

    /// Ignore cached and remote data; analyze synthetic bars only.
    pub fn synthetic_only(mut self, yes: bool) -> Self {
        self.synthetic_only = yes;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    /// Run the full pipeline for `ticker` as of now.
    pub fn run(&self, ticker: &str) -> Result<InstrumentReport, PipelineError> {
        self.run_at(ticker, Utc::now())
    }

    /// Run the full pipeline for `ticker` with an explicit clock.
    pub fn run_at(&self, ticker: &str, now: DateTime<Utc>) -> Result<InstrumentReport, PipelineError> {
        let symbology = &self.config.symbology;
        let symbol = symbology.source_symbol(ticker.trim());
        info!(symbol = %symbol, "starting pipeline");

        let mut opts = LoadOptions::from_config(&self.config.data, now.date_naive());
        opts.synthetic_only = self.synthetic_only;
        let loaded = load_bars(
            &symbol,
            &self.cache,
            self.provider.as_deref(),
            &opts,
            &self.config.engine.seeds(),
        )?;
        if loaded.bars.is_empty() {
            return Err(PipelineError::NoBars(symbol));
        }

        let friendly_name = symbology.friendly_name(&symbol);
        let ml = self.predictions.lookup(
            [Some(symbol.as_str()), friendly_name.as_deref(), Some(ticker.trim())]
                .into_iter()
                .flatten(),
        );

        let analysis = analyze(&symbol, &loaded.bars, &self.config.engine, ml);
        debug!(
            symbol = %symbol,
            direction = analysis.verdict.direction.as_str(),
            confidence = analysis.verdict.confidence,
            "verdict computed"
        );

        let snapshot = Snapshot {
            meta: Meta::new(&symbol, now, loaded.source),
            metrics: SnapshotMetrics::new(analysis.metrics, analysis.verdict.clone(), ml),
            features_head: features_head(&analysis.rows, self.config.output.history_rows),
            series: analysis.series,
        };

        let mut files = self.writer.write(
            &symbol,
            &snapshot,
            &analysis.deterministic,
            &analysis.monte_carlo,
        )?;

        let friendly_name = friendly_name.filter(|_| self.config.output.friendly_copies);
        if let Some(name) = &friendly_name {
            files.extend(self.writer.write(
                name,
                &snapshot.renamed(name),
                &analysis.deterministic,
                &analysis.monte_carlo,
            )?);
            info!(symbol = %symbol, friendly = %name, "wrote friendly-name copy");
        }

        info!(
            symbol = %symbol,
            source = loaded.source.as_str(),
            bars = loaded.bars.len(),
            "pipeline complete"
        );
        Ok(InstrumentReport {
            symbol,
            friendly_name,
            source: loaded.source,
            bars: loaded.bars.len(),
            verdict: analysis.verdict,
            files,
        })
    }
}

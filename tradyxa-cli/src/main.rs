//! Tradyxa CLI — per-instrument and batch snapshot generation.
//!
//! Commands:
//! - `run`: load bars (cache, else synthetic) and write one instrument's snapshot
//! - `sample`: same, on synthetic bars only
//! - `batch`: run every ticker of a tickers file on a worker pool
//! - `config`: print the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradyxa_runner::{
    read_tickers, run_batch, InstrumentReport, MlPredictions, Pipeline, PipelineConfig,
};

#[derive(Parser)]
#[command(
    name = "tradyxa",
    about = "Tradyxa — liquidity features, slippage simulation and execution verdicts"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used for anything omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for snapshot JSON (overrides the config).
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// JSON file of precomputed model outputs keyed by ticker (overrides the config).
    #[arg(long, global = true)]
    ml_predictions: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline for one instrument.
    Run {
        /// Ticker or friendly name (e.g. NIFTY, AXISBANK, TCS.NS).
        #[arg(long)]
        ticker: String,

        /// Fail instead of falling back to synthetic data.
        #[arg(long, default_value_t = false)]
        no_synthetic: bool,
    },
    /// Run the pipeline for one instrument on synthetic bars.
    Sample {
        #[arg(long)]
        ticker: String,
    },
    /// Run the pipeline for every ticker in a file, one per line.
    Batch {
        #[arg(long)]
        tickers_file: PathBuf,

        /// Worker threads (overrides the config).
        #[arg(long)]
        max_workers: Option<usize>,

        /// Fail instead of falling back to synthetic data.
        #[arg(long, default_value_t = false)]
        no_synthetic: bool,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    if let Some(path) = cli.ml_predictions {
        config.ml.predictions = Some(path);
    }

    match cli.command {
        Commands::Run {
            ticker,
            no_synthetic,
        } => {
            config.data.synthetic_fallback &= !no_synthetic;
            run_one(config, &ticker, false)
        }
        Commands::Sample { ticker } => run_one(config, &ticker, true),
        Commands::Batch {
            tickers_file,
            max_workers,
            no_synthetic,
        } => {
            config.data.synthetic_fallback &= !no_synthetic;
            if let Some(n) = max_workers {
                config.batch.max_workers = n;
            }
            run_batch_cmd(config, &tickers_file)
        }
        Commands::Config => {
            print!("{}", PipelineConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => {
            let config = PipelineConfig::from_file(p)
                .with_context(|| format!("failed to load config {}", p.display()))?;
            info!(path = %p.display(), "loaded config");
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn build_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    config.validate().context("invalid configuration")?;
    let predictions = match &config.ml.predictions {
        Some(path) => MlPredictions::load(path)?,
        None => MlPredictions::default(),
    };
    Ok(Pipeline::new(config).with_predictions(predictions))
}

fn run_one(config: PipelineConfig, ticker: &str, synthetic_only: bool) -> Result<()> {
    let pipeline = build_pipeline(config)?.synthetic_only(synthetic_only);
    let report = pipeline
        .run(ticker)
        .with_context(|| format!("pipeline failed for {ticker}"))?;
    print_report(&report);
    Ok(())
}

fn run_batch_cmd(config: PipelineConfig, tickers_file: &Path) -> Result<()> {
    let tickers = read_tickers(tickers_file)?;
    if tickers.is_empty() {
        bail!("no tickers in {}", tickers_file.display());
    }
    let max_workers = config.batch.max_workers;
    let pipeline = build_pipeline(config)?;
    let summary = run_batch(&pipeline, &tickers, max_workers)?;

    for report in &summary.succeeded {
        print_report(report);
    }
    println!();
    println!(
        "Batch complete: {} succeeded, {} failed",
        summary.success_count(),
        summary.error_count()
    );
    for failure in &summary.failed {
        eprintln!("Error for {}: {}", failure.ticker, failure.error);
    }
    if summary.success_count() == 0 {
        bail!("every ticker failed");
    }
    Ok(())
}

fn print_report(report: &InstrumentReport) {
    let v = &report.verdict;
    println!(
        "{:<14} {:<9} {:>4} bars  {:<7} {:>9.2} ± {:<8.2} conf {:.2}  [{}]",
        report.symbol,
        report.source.as_str(),
        report.bars,
        v.direction.as_str(),
        v.points,
        v.error,
        v.confidence,
        report.friendly_name.as_deref().unwrap_or("-"),
    );
}

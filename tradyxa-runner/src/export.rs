//! Snapshot export.
//!
//! Each instrument produces three JSON documents in the output directory:
//! - `{ticker}.json`: the [`Snapshot`]
//! - `{ticker}_slippage.json`: deterministic summaries keyed by notional
//! - `{ticker}_monte_slippage.json`: Monte Carlo summaries keyed by notional
//!
//! Every file is written to a `.tmp` sibling first and renamed into place,
//! so readers never observe a partially written document.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tradyxa_core::slippage::SlippageTable;

use crate::snapshot::Snapshot;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    debug!(path = %path.display(), "wrote JSON");
    Ok(())
}

/// Writes instrument documents under one output directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.json"))
    }

    pub fn slippage_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}_slippage.json"))
    }

    pub fn monte_slippage_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}_monte_slippage.json"))
    }

    /// Write the snapshot and both slippage files for `ticker`. Returns the
    /// paths written, snapshot first.
    pub fn write(
        &self,
        ticker: &str,
        snapshot: &Snapshot,
        deterministic: &SlippageTable,
        monte_carlo: &SlippageTable,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let paths = vec![
            self.snapshot_path(ticker),
            self.slippage_path(ticker),
            self.monte_slippage_path(ticker),
        ];
        write_json_atomic(&paths[0], snapshot)?;
        write_json_atomic(&paths[1], deterministic)?;
        write_json_atomic(&paths[2], monte_carlo)?;
        Ok(paths)
    }
}

//! Instrument symbology: dashboard names vs. data-source symbols.
//!
//! The dashboard addresses instruments by friendly names (`NIFTY`,
//! `AXISBANK`) while the price source uses exchange-qualified symbols
//! (`^NSEI`, `AXISBANK.NS`). Index names are resolved through an alias map;
//! plain equities get the exchange suffix appended.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exchange suffix appended to bare equity tickers.
pub const EXCHANGE_SUFFIX: &str = ".NS";

/// Bidirectional mapping between friendly names and source symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbology {
    /// Friendly index name → source symbol (e.g. `NIFTY` → `^NSEI`).
    pub index_aliases: BTreeMap<String, String>,
}

impl Default for Symbology {
    fn default() -> Self {
        let mut index_aliases = BTreeMap::new();
        index_aliases.insert("NIFTY".to_string(), "^NSEI".to_string());
        index_aliases.insert("BANKNIFTY".to_string(), "^NSEBANK".to_string());
        Self { index_aliases }
    }
}

impl Symbology {
    /// Source symbol for a ticker as typed by a user or listed in a tickers file.
    pub fn source_symbol(&self, ticker: &str) -> String {
        if let Some(sym) = self.index_aliases.get(ticker) {
            return sym.clone();
        }
        if ticker.ends_with(EXCHANGE_SUFFIX) || ticker.starts_with('^') {
            return ticker.to_string();
        }
        format!("{ticker}{EXCHANGE_SUFFIX}")
    }

    /// Friendly dashboard name for a source symbol, if it differs from the symbol.
    pub fn friendly_name(&self, symbol: &str) -> Option<String> {
        if let Some((name, _)) = self.index_aliases.iter().find(|(_, s)| s.as_str() == symbol) {
            return Some(name.clone());
        }
        symbol
            .strip_suffix(EXCHANGE_SUFFIX)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// File-system safe key for a symbol (`^NSEI` → `NSEI`, `TCS.NS` → `TCS_NS`).
pub fn file_key(symbol: &str) -> String {
    symbol.replace('^', "").replace('.', "_")
}

//! Tradyxa Core — feature-and-slippage engine.
//!
//! Pure transforms from an ordered OHLCV series to:
//! - per-bar liquidity / impact / flow features
//! - deterministic and Monte Carlo slippage summaries per notional
//! - a confidence-weighted directional verdict
//! - presentation series (volume profile, bands, orderbook, ...)
//!
//! Plus the local CSV cache and the provider trait the runner loads bars through.
//! Nothing here holds shared mutable state; all randomness is seeded per call.

pub mod config;
pub mod data;
pub mod domain;
pub mod features;
pub mod rng;
pub mod series;
pub mod slippage;
pub mod verdict;
pub mod window;

pub use config::{ConfigError, EngineConfig};

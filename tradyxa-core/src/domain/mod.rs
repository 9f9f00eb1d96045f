//! Domain types for Tradyxa

pub mod bar;
pub mod instrument;

pub use bar::{Bar, BarError};
pub use instrument::{file_key, Symbology, EXCHANGE_SUFFIX};

/// Symbol type alias
pub type Symbol = String;

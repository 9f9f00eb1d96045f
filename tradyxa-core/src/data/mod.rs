//! Data ingestion and caching

pub mod cache;
pub mod canonicalize;
pub mod provider;

pub use cache::{parse_timestamp, CacheError, CsvCache};
pub use canonicalize::{canonicalize, is_canonical, merge};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};

//! Market data: provider trait, Yahoo Finance client, history cache

pub mod cache;
pub mod circuit_breaker;
pub mod history;
pub mod provider;
pub mod yahoo;

pub use cache::{CacheMeta, CacheStatus, HistoryCache};
pub use circuit_breaker::CircuitBreaker;
pub use history::{
    download_symbols, fetch_full_history, fetch_history, CachedProvider, DownloadSummary,
};
pub use provider::{
    DataError, DataProvider, DataSource, DownloadProgress, FetchResult, RawBar, StdoutProgress,
};
pub use yahoo::YahooProvider;

//! History fetch entry points, the cache-backed provider, and batch download.

use super::cache::HistoryCache;
use super::provider::{DataError, DataProvider, DataSource, DownloadProgress, FetchResult, RawBar};
use crate::domain::{normalize_symbol, DatedPrice, PriceSeries};
use crate::error::{PricecastError, Result};
use chrono::{Local, NaiveDate};
use std::time::Duration;

/// `[today - lookback_days, today]` in local time.
pub fn lookback_range(lookback_days: u32) -> (NaiveDate, NaiveDate) {
    let end = Local::now().date_naive();
    let start = end - chrono::Duration::days(i64::from(lookback_days));
    (start, end)
}

/// Daily closes with dates, oldest first.
///
/// Unknown or delisted symbols, and histories with no usable close, are
/// `InsufficientData`.
pub fn fetch_full_history(
    provider: &dyn DataProvider,
    symbol: &str,
    lookback_days: u32,
) -> Result<Vec<DatedPrice>> {
    let symbol = normalize_symbol(symbol)?;
    let (start, end) = lookback_range(lookback_days);
    let history = provider.fetch(&symbol, start, end)?.closes();
    if history.is_empty() {
        return Err(PricecastError::InsufficientData(format!(
            "no closing prices for '{symbol}' between {start} and {end}"
        )));
    }
    Ok(history)
}

/// Daily closes only, oldest first.
pub fn fetch_history(
    provider: &dyn DataProvider,
    symbol: &str,
    lookback_days: u32,
) -> Result<PriceSeries> {
    fetch_full_history(provider, symbol, lookback_days).map(|h| PriceSeries::from_dated(&h))
}

/// Serves fresh cache hits; otherwise fetches from the inner provider and
/// writes the result back.
///
/// A cache write failure is logged and does not fail the fetch. Cache hits
/// are filtered to the requested date range.
pub struct CachedProvider<P> {
    inner: P,
    cache: HistoryCache,
    max_age: Duration,
}

impl<P: DataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: HistoryCache, max_age: Duration) -> Self {
        Self {
            inner,
            cache,
            max_age,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn from_cache(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<FetchResult> {
        if !self.cache.is_fresh(symbol, self.max_age) {
            return None;
        }
        let meta = self.cache.get_meta(symbol)?;
        // Cached window must reach back to the requested start.
        if meta.covered_from() > start {
            return None;
        }
        let history = self.cache.load(symbol).ok()?;
        let bars: Vec<RawBar> = history
            .into_iter()
            .filter(|p| p.date >= start && p.date <= end)
            .map(|p| RawBar::from_close(p.date, p.value))
            .collect();
        if bars.is_empty() {
            return None;
        }
        Some(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Cache,
        })
    }
}

impl<P: DataProvider> DataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> std::result::Result<FetchResult, DataError> {
        if let Some(hit) = self.from_cache(symbol, start, end) {
            tracing::debug!(symbol, bars = hit.bars.len(), "cache hit");
            return Ok(hit);
        }

        tracing::debug!(symbol, provider = self.inner.name(), "cache miss, fetching");
        let result = self.inner.fetch(symbol, start, end)?;
        let closes = result.closes();
        if let Err(e) = self
            .cache
            .write(symbol, &closes, self.inner.name(), Some(start))
        {
            tracing::warn!(symbol, error = %e, "failed to cache history");
        }
        Ok(result)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

/// Summary of a batch download.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Fetch several symbols into the cache, skipping fresh ones unless `force`.
///
/// Stops early (marking the rest failed) once the provider reports it is
/// unavailable.
pub fn download_symbols(
    provider: &dyn DataProvider,
    cache: &HistoryCache,
    symbols: &[&str],
    lookback_days: u32,
    max_age: Duration,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let (start, end) = lookback_range(lookback_days);
    let mut succeeded = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && cache.is_fresh(symbol, max_age) {
            let cached = cache.get_meta(symbol).map(|m| m.bar_count).unwrap_or(0);
            progress.on_complete(symbol, &Ok(cached));
            succeeded += 1;
            continue;
        }

        let result = provider.fetch(symbol, start, end).and_then(|fetched| {
            let closes = fetched.closes();
            cache.write(symbol, &closes, provider.name(), Some(start))?;
            Ok(closes.len())
        });
        progress.on_complete(symbol, &result);

        match result {
            Ok(_) => succeeded += 1,
            Err(e) => errors.push((symbol.to_string(), e)),
        }

        if !provider.is_available() {
            for sym in &symbols[(i + 1)..] {
                errors.push((
                    sym.to_string(),
                    DataError::Other("skipped: provider unavailable".into()),
                ));
            }
            break;
        }
    }

    let failed = errors.len();
    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

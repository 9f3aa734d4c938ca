//! Parquet history cache.
//!
//! Layout: `{cache_dir}/symbol={SYMBOL}/history.parquet` + `meta.json`
//!
//! - Atomic writes (write to .tmp, rename into place)
//! - Freshness check against the sidecar's `fetched_at`
//! - Integrity validation on load (schema check, row count > 0)
//! - Quarantine for corrupt files (`history.parquet.quarantined`)

use super::provider::DataError;
use crate::domain::DatedPrice;
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const HISTORY_FILE: &str = "history.parquet";
const META_FILE: &str = "meta.json";

/// Metadata sidecar for a cached symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Start of the range the fetch asked for. Weekends and holidays mean
    /// this is often earlier than `start_date`.
    #[serde(default)]
    pub requested_start: Option<NaiveDate>,
    pub bar_count: usize,
    pub data_hash: String,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl CacheMeta {
    /// First date the cached history is known to cover.
    pub fn covered_from(&self) -> NaiveDate {
        self.requested_start.unwrap_or(self.start_date)
    }
}

pub struct HistoryCache {
    cache_dir: PathBuf,
}

impl HistoryCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn symbol_dir(&self, symbol: &str) -> PathBuf {
        self.cache_dir.join(format!("symbol={symbol}"))
    }

    fn history_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join(HISTORY_FILE)
    }

    fn meta_path(&self, symbol: &str) -> PathBuf {
        self.symbol_dir(symbol).join(META_FILE)
    }

    /// Replace the cached history for `symbol`.
    ///
    /// `requested_start` is the start of the fetched range, if known.
    pub fn write(
        &self,
        symbol: &str,
        history: &[DatedPrice],
        source: &str,
        requested_start: Option<NaiveDate>,
    ) -> Result<(), DataError> {
        let (first, last) = match (history.first(), history.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DataError::CacheError("no prices to cache".into())),
        };

        let sym_dir = self.symbol_dir(symbol);
        fs::create_dir_all(&sym_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let mut df = history_to_dataframe(history)?;
        let path = self.history_path(symbol);
        let tmp_path = path.with_extension("parquet.tmp");
        write_parquet(&mut df, &tmp_path)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DataError::CacheError(format!("atomic rename failed: {e}"))
        })?;

        let hash_input = serde_json::to_vec(history)
            .map_err(|e| DataError::CacheError(format!("hash serialization: {e}")))?;
        let meta = CacheMeta {
            symbol: symbol.to_string(),
            start_date: first.date,
            end_date: last.date,
            requested_start: requested_start.map(|d| d.min(first.date)),
            bar_count: history.len(),
            data_hash: blake3::hash(&hash_input).to_hex().to_string(),
            source: source.to_string(),
            fetched_at: Utc::now(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| DataError::CacheError(format!("meta serialization: {e}")))?;
        fs::write(self.meta_path(symbol), meta_json)
            .map_err(|e| DataError::CacheError(format!("meta write: {e}")))?;

        tracing::debug!(symbol, rows = history.len(), "history cached");
        Ok(())
    }

    /// Load cached history for a symbol, sorted by date ascending.
    ///
    /// A file that fails validation is quarantined and reported as missing.
    pub fn load(&self, symbol: &str) -> Result<Vec<DatedPrice>, DataError> {
        let path = self.history_path(symbol);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
            });
        }

        match load_and_validate_parquet(&path) {
            Ok(mut history) => {
                history.sort_by_key(|p| p.date);
                Ok(history)
            }
            Err(e) => {
                let quarantine = path.with_extension("parquet.quarantined");
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "quarantining corrupt cache file"
                );
                let _ = fs::rename(&path, &quarantine);
                let _ = fs::remove_file(self.meta_path(symbol));
                Err(DataError::NoCachedData {
                    symbol: symbol.to_string(),
                })
            }
        }
    }

    pub fn get_meta(&self, symbol: &str) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(symbol)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// True when the cached history was fetched less than `max_age` ago.
    pub fn is_fresh(&self, symbol: &str, max_age: Duration) -> bool {
        let Some(meta) = self.get_meta(symbol) else {
            return false;
        };
        let age = Utc::now().signed_duration_since(meta.fetched_at);
        match age.to_std() {
            Ok(age) => age < max_age,
            // fetched_at in the future (clock skew): treat as fresh
            Err(_) => true,
        }
    }

    pub fn status(&self, symbols: &[&str]) -> Vec<CacheStatus> {
        symbols
            .iter()
            .map(|sym| {
                let meta = self.get_meta(sym);
                CacheStatus {
                    symbol: sym.to_string(),
                    cached: meta.is_some(),
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                    fetched_at: meta.as_ref().map(|m| m.fetched_at),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub symbol: String,
    pub cached: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
    pub fetched_at: Option<DateTime<Utc>>,
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn history_to_dataframe(history: &[DatedPrice]) -> Result<DataFrame, DataError> {
    let dates: Vec<i32> = history
        .iter()
        .map(|p| (p.date - epoch()).num_days() as i32)
        .collect();
    let closes: Vec<f64> = history.iter().map(|p| p.value).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| DataError::ParquetError(format!("date cast: {e}")))?,
        Column::new("close".into(), closes),
    ])
    .map_err(|e| DataError::ParquetError(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file =
        fs::File::create(path).map_err(|e| DataError::ParquetError(format!("create file: {e}")))?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| DataError::ParquetError(format!("write parquet: {e}")))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path) -> Result<Vec<DatedPrice>, DataError> {
    let file = fs::File::open(path).map_err(|e| DataError::ParquetError(format!("open: {e}")))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::ParquetError(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(DataError::ValidationError("empty parquet file".into()));
    }

    let map_err = |e: PolarsError| DataError::ValidationError(format!("column read: {e}"));
    let date_ca = df
        .column("date")
        .map_err(map_err)?
        .date()
        .map_err(|e| DataError::ValidationError(format!("date column type: {e}")))?;
    let close_ca = df
        .column("close")
        .map_err(map_err)?
        .f64()
        .map_err(|e| DataError::ValidationError(format!("close column type: {e}")))?;

    let mut history = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let days = date_ca
            .get(i)
            .ok_or_else(|| DataError::ValidationError(format!("null date at row {i}")))?;
        history.push(DatedPrice::new(
            epoch() + chrono::Duration::days(days as i64),
            close_ca.get(i).unwrap_or(f64::NAN),
        ));
    }

    Ok(history)
}

//! Price series and window request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PricecastError, Result};

/// Daily closing prices in chronological order (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(closes: Vec<f64>) -> Self {
        Self { closes }
    }

    /// Build from dated prices, keeping only finite closes.
    pub fn from_dated(history: &[DatedPrice]) -> Self {
        Self {
            closes: history
                .iter()
                .map(|p| p.value)
                .filter(|v| v.is_finite())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.closes
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(closes: Vec<f64>) -> Self {
        Self::new(closes)
    }
}

/// A single dated value: a historical close or a forecast point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedPrice {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedPrice {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// How many trailing days to show as "actual" and how many as "prediction".
///
/// Counts are signed so that user input can be carried as typed and
/// rejected by [`WindowRequest::validate`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRequest {
    pub actual_days: i64,
    pub prediction_days: i64,
}

impl WindowRequest {
    pub fn new(actual_days: i64, prediction_days: i64) -> Self {
        Self {
            actual_days,
            prediction_days,
        }
    }

    /// Reject non-positive day counts. Returns `(actual, prediction)` as `usize`.
    pub fn validate(&self) -> Result<(usize, usize)> {
        if self.actual_days <= 0 {
            return Err(PricecastError::InvalidParameter(format!(
                "actual_days must be >= 1, got {}",
                self.actual_days
            )));
        }
        if self.prediction_days <= 0 {
            return Err(PricecastError::InvalidParameter(format!(
                "prediction_days must be >= 1, got {}",
                self.prediction_days
            )));
        }
        Ok((self.actual_days as usize, self.prediction_days as usize))
    }

    /// `actual_days + prediction_days`, saturating.
    pub fn total(&self) -> i64 {
        self.actual_days.saturating_add(self.prediction_days)
    }
}

impl Default for WindowRequest {
    fn default() -> Self {
        Self::new(60, 7)
    }
}

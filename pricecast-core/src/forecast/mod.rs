//! Time-series forecasting.
//!
//! A [`Forecaster`] fits a [`FittedModel`] to dated history; the model then
//! projects `horizon_days` calendar days past the last observation.

pub mod holt;

pub use holt::{HoltForecaster, HoltModel};

use crate::domain::DatedPrice;
use crate::error::{PricecastError, Result};
use chrono::NaiveDate;

pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    fn fit(&self, history: &[DatedPrice]) -> Result<Box<dyn FittedModel>>;
}

pub trait FittedModel: Send + Sync + std::fmt::Debug {
    /// One point per calendar day after the last fitted date.
    fn forecast(&self, horizon_days: u32) -> Result<Vec<DatedPrice>>;
}

pub(crate) fn check_horizon(horizon_days: u32) -> Result<()> {
    if horizon_days == 0 {
        return Err(PricecastError::InvalidParameter(
            "horizon_days must be >= 1".into(),
        ));
    }
    Ok(())
}

/// The `horizon_days` calendar dates following `last`.
pub(crate) fn future_dates(last: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
    last.iter_days().skip(1).take(horizon_days as usize).collect()
}

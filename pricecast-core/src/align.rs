//! Series alignment for overlay charts.
//!
//! Two alignments live here:
//! - [`align`] splits the tail of a price series into an "actual" window and a
//!   "prediction" window whose x-ranges touch: actual is `[0, actual_days)`,
//!   prediction is `[actual_days, actual_days + prediction_days)`.
//! - [`join_forecast`] outer-joins dated history with dated model output on a
//!   common date axis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ChartData, DatedPrice, LabeledSeries, PriceSeries, WindowRequest};
use crate::error::{PricecastError, Result};

pub const ACTUAL_LABEL: &str = "Actual";
pub const PREDICTION_LABEL: &str = "Prediction";
pub const FORECAST_LABEL: &str = "Forecast";

/// Actual and predicted windows as `(x, price)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub actual: Vec<(usize, f64)>,
    pub predicted: Vec<(usize, f64)>,
    /// The window that was asked for (lengths may be shorter, see [`AlignedSeries::is_partial`]).
    pub actual_days: usize,
    pub prediction_days: usize,
}

impl AlignedSeries {
    /// True when the series was shorter than `actual_days + prediction_days`.
    /// A partial result is informational only.
    pub fn is_partial(&self) -> bool {
        self.actual.len() < self.actual_days || self.predicted.len() < self.prediction_days
    }

    /// Chart payload with `Actual` and `Prediction` lines.
    pub fn to_chart(&self, symbol: &str) -> ChartData {
        let to_points = |pairs: &[(usize, f64)]| -> Vec<(f64, f64)> {
            pairs.iter().map(|&(x, y)| (x as f64, y)).collect()
        };
        ChartData {
            title: format!("{symbol} Price Trend"),
            x_label: "Days".into(),
            y_label: "Price".into(),
            series: vec![
                LabeledSeries::new(ACTUAL_LABEL, to_points(&self.actual)),
                LabeledSeries::new(PREDICTION_LABEL, to_points(&self.predicted)),
            ],
        }
    }
}

/// Split the tail of `prices` into contiguous actual/prediction windows.
///
/// With enough data the last `actual_days + prediction_days` prices are used:
/// the first `actual_days` become the actual window, the rest the prediction
/// window. With too little data the prediction window is filled first (from
/// the newest prices) and the actual window gets whatever precedes it, still
/// ending at x = `actual_days - 1`. Output never exceeds the input length.
pub fn align(prices: &PriceSeries, window: WindowRequest) -> Result<AlignedSeries> {
    let (actual_days, prediction_days) = window.validate()?;
    if prices.is_empty() {
        return Err(PricecastError::InsufficientData(
            "price series is empty".into(),
        ));
    }

    let values = prices.as_slice();
    let n = values.len();

    let predicted_len = prediction_days.min(n);
    let actual_len = actual_days.min(n - predicted_len);

    let predicted_start = n - predicted_len;
    let actual_start = predicted_start - actual_len;

    // Actual points end at x = actual_days - 1 regardless of how many there are.
    let actual_x0 = actual_days - actual_len;
    let actual = values[actual_start..predicted_start]
        .iter()
        .enumerate()
        .map(|(i, &y)| (actual_x0 + i, y))
        .collect();

    let predicted = values[predicted_start..]
        .iter()
        .enumerate()
        .map(|(i, &y)| (actual_days + i, y))
        .collect();

    Ok(AlignedSeries {
        actual,
        predicted,
        actual_days,
        prediction_days,
    })
}

// ── Forecast join ───────────────────────────────────────────────────

/// One date on the joined actual/forecast axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
}

/// Historical actuals and model output on a common, ascending date axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    /// Chart payload with `Actual` and `Forecast` lines.
    ///
    /// x is the number of calendar days since the first row.
    pub fn to_chart(&self, symbol: &str) -> ChartData {
        let origin = self.first_date();
        let x_of = |date: NaiveDate| -> f64 {
            origin.map_or(0.0, |o| (date - o).num_days() as f64)
        };

        let actual = self
            .rows
            .iter()
            .filter_map(|r| r.actual.map(|v| (x_of(r.date), v)))
            .collect();
        let forecast = self
            .rows
            .iter()
            .filter_map(|r| r.forecast.map(|v| (x_of(r.date), v)))
            .collect();

        let x_label = match origin {
            Some(o) => format!("Days since {o}"),
            None => "Days".into(),
        };

        ChartData {
            title: format!("{symbol} Price Forecast"),
            x_label,
            y_label: "Price".into(),
            series: vec![
                LabeledSeries::new(ACTUAL_LABEL, actual),
                LabeledSeries::new(FORECAST_LABEL, forecast),
            ],
        }
    }
}

/// Outer-join history and forecast by date.
///
/// Every date from either side gets a row; a date present on both sides
/// carries both values. Duplicate dates within one side keep the last value.
pub fn join_forecast(history: &[DatedPrice], forecast: &[DatedPrice]) -> ForecastTable {
    let mut all_dates = BTreeSet::new();
    for p in history.iter().chain(forecast) {
        all_dates.insert(p.date);
    }

    let actual_by_date: BTreeMap<NaiveDate, f64> =
        history.iter().map(|p| (p.date, p.value)).collect();
    let forecast_by_date: BTreeMap<NaiveDate, f64> =
        forecast.iter().map(|p| (p.date, p.value)).collect();

    let rows = all_dates
        .into_iter()
        .map(|date| ForecastRow {
            date,
            actual: actual_by_date.get(&date).copied(),
            forecast: forecast_by_date.get(&date).copied(),
        })
        .collect();

    ForecastTable { rows }
}

//! Holt's linear exponential smoothing.
//!
//! level[t] = alpha * y[t] + (1 - alpha) * (level[t-1] + trend[t-1])
//! trend[t] = beta * (level[t] - level[t-1]) + (1 - beta) * trend[t-1]
//! Seed: level[0] = y[0], trend[0] = y[1] - y[0].
//! Forecast: y[n-1+h] = level[n-1] + h * trend[n-1].
//!
//! alpha and beta are picked from a 0.05..=0.95 grid by minimizing the
//! one-step-ahead squared error over the history.

use super::{check_horizon, future_dates, FittedModel, Forecaster};
use crate::domain::DatedPrice;
use crate::error::{PricecastError, Result};
use chrono::NaiveDate;

const GRID_STEPS: usize = 19;
const GRID_START: f64 = 0.05;
const GRID_STEP: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct HoltForecaster {
    min_history: usize,
}

impl HoltForecaster {
    /// `min_history` is clamped to at least 2 (the trend seed needs two points).
    pub fn new(min_history: usize) -> Self {
        Self {
            min_history: min_history.max(2),
        }
    }
}

impl Default for HoltForecaster {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Smoothing state after a full pass over the history.
#[derive(Debug, Clone, Copy)]
struct Smoothed {
    level: f64,
    trend: f64,
    sse: f64,
}

fn smooth(values: &[f64], alpha: f64, beta: f64) -> Smoothed {
    let mut level = values[0];
    let mut trend = values[1] - values[0];
    let mut sse = 0.0;

    for &y in &values[1..] {
        let predicted = level + trend;
        sse += (y - predicted).powi(2);
        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }

    Smoothed { level, trend, sse }
}

impl Forecaster for HoltForecaster {
    fn name(&self) -> &str {
        "holt_linear"
    }

    fn fit(&self, history: &[DatedPrice]) -> Result<Box<dyn FittedModel>> {
        if history.len() < self.min_history {
            return Err(PricecastError::ModelFit(format!(
                "need at least {} observations, got {}",
                self.min_history,
                history.len()
            )));
        }

        let mut sorted = history.to_vec();
        sorted.sort_by_key(|p| p.date);
        if let Some(bad) = sorted.iter().find(|p| !p.value.is_finite()) {
            return Err(PricecastError::ModelFit(format!(
                "non-finite value on {}",
                bad.date
            )));
        }
        if let Some(bad) = sorted.iter().find(|p| p.value < 0.0) {
            return Err(PricecastError::ModelFit(format!(
                "negative value {} on {}",
                bad.value, bad.date
            )));
        }
        let values: Vec<f64> = sorted.iter().map(|p| p.value).collect();

        let mut best: Option<(f64, f64, Smoothed)> = None;
        for i in 0..GRID_STEPS {
            let alpha = GRID_START + GRID_STEP * i as f64;
            for j in 0..GRID_STEPS {
                let beta = GRID_START + GRID_STEP * j as f64;
                let s = smooth(&values, alpha, beta);
                if !s.sse.is_finite() {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| s.sse < b.sse) {
                    best = Some((alpha, beta, s));
                }
            }
        }

        let (alpha, beta, state) = best.ok_or_else(|| {
            PricecastError::ModelFit("smoothing diverged for every parameter pair".into())
        })?;
        // `sorted` is non-empty: min_history >= 2.
        let last_date = sorted[sorted.len() - 1].date;

        tracing::debug!(alpha, beta, sse = state.sse, points = values.len(), "holt fit");

        Ok(Box::new(HoltModel {
            alpha,
            beta,
            level: state.level,
            trend: state.trend,
            last_date,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoltModel {
    pub alpha: f64,
    pub beta: f64,
    pub level: f64,
    pub trend: f64,
    pub last_date: NaiveDate,
}

impl FittedModel for HoltModel {
    fn forecast(&self, horizon_days: u32) -> Result<Vec<DatedPrice>> {
        check_horizon(horizon_days)?;
        Ok(future_dates(self.last_date, horizon_days)
            .into_iter()
            .enumerate()
            .map(|(i, date)| DatedPrice::new(date, self.level + (i as f64 + 1.0) * self.trend))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(values: &[f64]) -> Vec<DatedPrice> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start
            .iter_days()
            .zip(values)
            .map(|(d, &v)| DatedPrice::new(d, v))
            .collect()
    }

    #[test]
    fn extrapolates_a_straight_line() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + 2.0 * i as f64).collect();
        let model = HoltForecaster::default().fit(&history(&values)).unwrap();
        let forecast = model.forecast(3).unwrap();

        assert_eq!(forecast.len(), 3);
        for (h, point) in forecast.iter().enumerate() {
            let expected = 10.0 + 2.0 * (29 + h + 1) as f64;
            assert!((point.value - expected).abs() < 1e-9, "{point:?} vs {expected}");
        }
        assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn flat_series_forecasts_flat() {
        let model = HoltForecaster::default()
            .fit(&history(&[5.0; 12]))
            .unwrap();
        for p in model.forecast(5).unwrap() {
            assert!((p.value - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn unsorted_history_is_sorted_before_fit() {
        let mut h = history(&(0..12).map(|i| i as f64).collect::<Vec<_>>());
        h.reverse();
        let model = HoltForecaster::default().fit(&h).unwrap();
        let next = model.forecast(1).unwrap();
        assert!((next[0].value - 12.0).abs() < 1e-9);
    }

    #[test]
    fn short_history_fails_to_fit() {
        let err = HoltForecaster::new(10).fit(&history(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, PricecastError::ModelFit(_)));
    }

    #[test]
    fn nan_history_fails_to_fit() {
        let mut values = vec![1.0; 12];
        values[4] = f64::NAN;
        let err = HoltForecaster::default().fit(&history(&values)).unwrap_err();
        assert!(matches!(err, PricecastError::ModelFit(_)));
    }

    #[test]
    fn negative_history_fails_to_fit() {
        let mut values: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
        values[7] = -3.5;
        let err = HoltForecaster::default().fit(&history(&values)).unwrap_err();
        match err {
            PricecastError::ModelFit(msg) => assert!(msg.contains("negative")),
            other => panic!("expected ModelFit, got {other:?}"),
        }
    }

    #[test]
    fn zero_values_are_accepted() {
        assert!(HoltForecaster::default().fit(&history(&[0.0; 12])).is_ok());
    }

    #[test]
    fn zero_horizon_is_invalid() {
        let model = HoltForecaster::default().fit(&history(&[1.0; 12])).unwrap();
        assert!(matches!(
            model.forecast(0),
            Err(PricecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn min_history_is_at_least_two() {
        let model = HoltForecaster::new(0).fit(&history(&[1.0, 3.0])).unwrap();
        let next = model.forecast(1).unwrap();
        assert!((next[0].value - 5.0).abs() < 1e-9);
    }
}

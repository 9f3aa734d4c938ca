//! Request/response handler behind both front-ends.
//!
//! One [`ChartService::handle`] call per user action: validate, fetch history,
//! align or forecast, and return a [`ChartData`] ready to draw. The service
//! keeps no per-request state.

use serde::Serialize;
use std::sync::Arc;

use crate::align::{align, join_forecast, AlignedSeries, ForecastTable};
use crate::config::AppConfig;
use crate::data::{
    fetch_full_history, fetch_history, CachedProvider, CircuitBreaker, DataProvider,
    HistoryCache, YahooProvider,
};
use crate::domain::{normalize_symbol, ChartData, WindowRequest};
use crate::error::Result;
use crate::forecast::{check_horizon, Forecaster, HoltForecaster};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartRequest {
    /// Actual vs. trailing-slice chart.
    Trend { symbol: String, window: WindowRequest },
    /// History plus a model forecast.
    Forecast { symbol: String, horizon_days: u32 },
}

impl ChartRequest {
    pub fn symbol(&self) -> &str {
        match self {
            ChartRequest::Trend { symbol, .. } | ChartRequest::Forecast { symbol, .. } => symbol,
        }
    }
}

/// The computed series behind a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartDetail {
    Trend(AlignedSeries),
    Forecast(ForecastTable),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartResponse {
    pub symbol: String,
    pub chart: ChartData,
    pub detail: ChartDetail,
    /// The data was shorter than the request; treat the chart as informational.
    pub partial: bool,
    /// Number of historical closes the chart was built from.
    pub history_points: usize,
}

pub struct ChartService {
    provider: Box<dyn DataProvider>,
    forecaster: Box<dyn Forecaster>,
    lookback_days: u32,
}

impl ChartService {
    pub fn new(
        provider: Box<dyn DataProvider>,
        forecaster: Box<dyn Forecaster>,
        lookback_days: u32,
    ) -> Self {
        Self {
            provider,
            forecaster,
            lookback_days,
        }
    }

    /// Yahoo Finance behind the history cache, Holt forecaster.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let breaker = Arc::new(CircuitBreaker::new(config.breaker_cooldown()));
        let yahoo = YahooProvider::new(breaker, config.request_timeout())?;
        let provider = CachedProvider::new(
            yahoo,
            HistoryCache::new(&config.cache_dir),
            config.cache_max_age(),
        );
        Ok(Self::new(
            Box::new(provider),
            Box::new(HoltForecaster::new(config.forecast.min_history)),
            config.lookback_days,
        ))
    }

    pub fn handle(&self, request: &ChartRequest) -> Result<ChartResponse> {
        match request {
            ChartRequest::Trend { symbol, window } => self.trend(symbol, *window),
            ChartRequest::Forecast {
                symbol,
                horizon_days,
            } => self.forecast(symbol, *horizon_days),
        }
    }

    fn trend(&self, symbol: &str, window: WindowRequest) -> Result<ChartResponse> {
        let symbol = normalize_symbol(symbol)?;
        window.validate()?;

        let prices = fetch_history(self.provider.as_ref(), &symbol, self.lookback_days)?;
        let aligned = align(&prices, window)?;
        let partial = aligned.is_partial();
        if partial {
            tracing::warn!(
                %symbol,
                available = prices.len(),
                requested = window.total(),
                "history shorter than requested window"
            );
        }

        Ok(ChartResponse {
            chart: aligned.to_chart(&symbol),
            detail: ChartDetail::Trend(aligned),
            partial,
            history_points: prices.len(),
            symbol,
        })
    }

    fn forecast(&self, symbol: &str, horizon_days: u32) -> Result<ChartResponse> {
        let symbol = normalize_symbol(symbol)?;
        check_horizon(horizon_days)?;

        let history = fetch_full_history(self.provider.as_ref(), &symbol, self.lookback_days)?;
        let model = self.forecaster.fit(&history)?;
        let predicted = model.forecast(horizon_days)?;
        tracing::info!(
            %symbol,
            model = self.forecaster.name(),
            history = history.len(),
            horizon_days,
            "forecast ready"
        );

        let table = join_forecast(&history, &predicted);
        Ok(ChartResponse {
            chart: table.to_chart(&symbol),
            detail: ChartDetail::Forecast(table),
            partial: false,
            history_points: history.len(),
            symbol,
        })
    }
}

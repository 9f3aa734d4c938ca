//! PriceCast Core: price history, series alignment, forecasting.
//!
//! - Domain types (price series, window requests, chart payloads)
//! - Series aligner for actual vs. prediction overlays
//! - Yahoo Finance provider with circuit breaker and Parquet history cache
//! - Holt linear forecaster
//! - Chart service: one request in, one renderable chart out

pub mod align;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod service;

pub use align::{align, join_forecast, AlignedSeries, ForecastRow, ForecastTable};
pub use config::AppConfig;
pub use domain::{ChartData, DatedPrice, LabeledSeries, PriceSeries, WindowRequest};
pub use error::{PricecastError, Result};
pub use service::{ChartDetail, ChartRequest, ChartResponse, ChartService};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed between the UI and the service are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<AlignedSeries>();
        require_sync::<AlignedSeries>();
        require_send::<ForecastTable>();
        require_sync::<ForecastTable>();
        require_send::<ChartData>();
        require_sync::<ChartData>();
        require_send::<ChartResponse>();
        require_sync::<ChartResponse>();
        require_send::<PricecastError>();
        require_sync::<PricecastError>();
        require_send::<ChartService>();
        require_sync::<ChartService>();
    }
}

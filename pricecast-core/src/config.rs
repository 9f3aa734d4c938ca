//! TOML application config.
//!
//! Looked up at `--config <path>` or `{config_dir}/pricecast/config.toml`.
//! A missing file means defaults; every field is optional.
//!
//! ```toml
//! cache_dir = "data"
//! lookback_days = 730
//!
//! [window]
//! actual_days = 60
//! prediction_days = 7
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::WindowRequest;
use crate::error::{PricecastError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Root of the Parquet history cache.
    pub cache_dir: PathBuf,
    /// Calendar days of history requested from the provider.
    pub lookback_days: u32,
    /// Cached history younger than this is reused without a fetch.
    pub cache_max_age_hours: u64,
    /// HTTP timeout per provider request.
    pub request_timeout_secs: u64,
    /// Circuit breaker cooldown after a ban or repeated failures.
    pub breaker_cooldown_secs: u64,
    pub window: WindowConfig,
    pub forecast: ForecastConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data"),
            lookback_days: 730,
            cache_max_age_hours: 12,
            request_timeout_secs: 30,
            breaker_cooldown_secs: 30 * 60,
            window: WindowConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

/// Defaults and slider bounds for the trend chart window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub actual_days: i64,
    pub prediction_days: i64,
    pub max_actual_days: i64,
    pub max_prediction_days: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            actual_days: 60,
            prediction_days: 7,
            max_actual_days: 365,
            max_prediction_days: 30,
        }
    }
}

impl WindowConfig {
    pub fn default_request(&self) -> WindowRequest {
        WindowRequest::new(self.actual_days, self.prediction_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub horizon_days: u32,
    pub max_horizon_days: u32,
    /// Fewer observations than this is a model fit error.
    pub min_history: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            max_horizon_days: 365,
            min_history: 10,
        }
    }
}

impl AppConfig {
    /// `{config_dir}/pricecast/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pricecast").join("config.toml"))
    }

    /// Parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PricecastError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| PricecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path (must exist) or the default path (may be missing).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.window;
        if w.max_actual_days < 1 || w.max_prediction_days < 1 {
            return Err(PricecastError::Config(
                "window maxima must be >= 1".into(),
            ));
        }
        if !(1..=w.max_actual_days).contains(&w.actual_days)
            || !(1..=w.max_prediction_days).contains(&w.prediction_days)
        {
            return Err(PricecastError::Config(format!(
                "default window {}+{} is outside 1..={} / 1..={}",
                w.actual_days, w.prediction_days, w.max_actual_days, w.max_prediction_days
            )));
        }
        let f = &self.forecast;
        if f.horizon_days == 0 || f.horizon_days > f.max_horizon_days {
            return Err(PricecastError::Config(format!(
                "forecast horizon {} is outside 1..={}",
                f.horizon_days, f.max_horizon_days
            )));
        }
        if self.lookback_days == 0 {
            return Err(PricecastError::Config("lookback_days must be >= 1".into()));
        }
        Ok(())
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_hours.saturating_mul(3600))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

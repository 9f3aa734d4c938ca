//! PriceCast CLI: trend and forecast charts, cache management.
//!
//! Commands:
//! - `trend`: actual vs. trailing-slice window for a symbol
//! - `forecast`: history plus a Holt forecast
//! - `download`: fetch history from Yahoo Finance into the Parquet cache
//! - `cache status`: what is cached, its date range and age

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pricecast_core::data::{
    download_symbols, CircuitBreaker, HistoryCache, StdoutProgress, YahooProvider,
};
use pricecast_core::domain::normalize_symbol;
use pricecast_core::{
    AppConfig, ChartData, ChartRequest, ChartResponse, ChartService, WindowRequest,
};

#[derive(Parser)]
#[command(
    name = "pricecast",
    about = "PriceCast CLI: stock and crypto price trend and forecast charts"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to {config_dir}/pricecast/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the cache directory from the config.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot the last N days as "actual" and the following M days as "prediction".
    Trend {
        /// Stock or crypto symbol (e.g., AAPL, BTC-USD).
        symbol: String,

        /// Number of actual trend days. Defaults to the config value (60).
        #[arg(long, allow_negative_numbers = true)]
        actual_days: Option<i64>,

        /// Number of prediction trend days. Defaults to the config value (7).
        #[arg(long, allow_negative_numbers = true)]
        prediction_days: Option<i64>,

        /// Print the chart as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fit a forecast model to the history and project it forward.
    Forecast {
        /// Stock or crypto symbol (e.g., AAPL, BTC-USD).
        symbol: String,

        /// Calendar days to forecast. Defaults to the config value (30).
        #[arg(long)]
        horizon: Option<u32>,

        /// Print the chart as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Download price history into the cache.
    Download {
        /// Symbols to download (e.g., SPY AAPL BTC-USD).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Re-download even if the cached copy is fresh.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached date ranges, bar counts and fetch times.
    Status {
        #[arg(required = true)]
        symbols: Vec<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }

    match cli.command {
        Commands::Trend {
            symbol,
            actual_days,
            prediction_days,
            json,
        } => {
            let window = WindowRequest::new(
                actual_days.unwrap_or(config.window.actual_days),
                prediction_days.unwrap_or(config.window.prediction_days),
            );
            run_chart(&config, ChartRequest::Trend { symbol, window }, json)
        }
        Commands::Forecast {
            symbol,
            horizon,
            json,
        } => {
            let horizon_days = horizon.unwrap_or(config.forecast.horizon_days);
            run_chart(
                &config,
                ChartRequest::Forecast {
                    symbol,
                    horizon_days,
                },
                json,
            )
        }
        Commands::Download { symbols, force } => run_download(&config, symbols, force),
        Commands::Cache { action } => match action {
            CacheAction::Status { symbols } => run_cache_status(&config, symbols),
        },
    }
}

fn run_chart(config: &AppConfig, request: ChartRequest, json: bool) -> Result<()> {
    let service = ChartService::from_config(config)?;
    tracing::debug!(?request, "handling chart request");
    let response = service
        .handle(&request)
        .map_err(|e| anyhow!("[{}] {e}", e.category()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }
    Ok(())
}

fn print_response(response: &ChartResponse) {
    println!("{}", response.chart.title);
    println!("History points: {}", response.history_points);
    if response.partial {
        println!("WARNING: not enough history for the requested window; chart is partial");
    }
    println!();
    print!("{}", format_chart_table(&response.chart));
}

/// One row per point: `label  x  y`, series in order.
fn format_chart_table(chart: &ChartData) -> String {
    let label_width = chart
        .series
        .iter()
        .map(|s| s.label.len())
        .max()
        .unwrap_or(0)
        .max(6);

    let mut out = format!(
        "{:<label_width$}  {:>8}  {:>12}\n",
        "Series", chart.x_label, chart.y_label
    );
    for series in &chart.series {
        for &(x, y) in &series.points {
            out.push_str(&format!("{:<label_width$}  {:>8}  {:>12.2}\n", series.label, x, y));
        }
    }
    out
}

/// Normalized tickers; the first invalid one aborts the command.
fn normalize_symbols(symbols: &[String]) -> Result<Vec<String>> {
    symbols
        .iter()
        .map(|s| normalize_symbol(s).map_err(|e| anyhow!("[{}] {e}", e.category())))
        .collect()
}

fn run_download(config: &AppConfig, symbols: Vec<String>, force: bool) -> Result<()> {
    let symbols = normalize_symbols(&symbols)?;

    let breaker = Arc::new(CircuitBreaker::new(config.breaker_cooldown()));
    let provider = YahooProvider::new(breaker, config.request_timeout())?;
    let cache = HistoryCache::new(&config.cache_dir);
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

    let summary = download_symbols(
        &provider,
        &cache,
        &sym_refs,
        config.lookback_days,
        config.cache_max_age(),
        force,
        &StdoutProgress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_cache_status(config: &AppConfig, symbols: Vec<String>) -> Result<()> {
    let cache = HistoryCache::new(&config.cache_dir);
    let symbols = normalize_symbols(&symbols)?;
    let sym_refs: Vec<&str> = symbols.iter().map(|s| s.as_str()).collect();

    println!("Cache: {}", cache.cache_dir().display());
    println!(
        "{:<10}  {:>6}  {:>10}  {:>10}  {:>6}  {}",
        "Symbol", "Cached", "Start", "End", "Bars", "Fetched"
    );
    for status in cache.status(&sym_refs) {
        let fmt_opt = |v: Option<String>| v.unwrap_or_else(|| "-".into());
        println!(
            "{:<10}  {:>6}  {:>10}  {:>10}  {:>6}  {}",
            status.symbol,
            if status.cached { "yes" } else { "no" },
            fmt_opt(status.start_date.map(|d| d.to_string())),
            fmt_opt(status.end_date.map(|d| d.to_string())),
            fmt_opt(status.bar_count.map(|n| n.to_string())),
            fmt_opt(status.fetched_at.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pricecast_core::LabeledSeries;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_trend_with_negative_days() {
        let cli =
            Cli::try_parse_from(["pricecast", "trend", "aapl", "--actual-days", "-3"]).unwrap();
        match cli.command {
            Commands::Trend {
                symbol,
                actual_days,
                prediction_days,
                json,
            } => {
                assert_eq!(symbol, "aapl");
                assert_eq!(actual_days, Some(-3));
                assert_eq!(prediction_days, None);
                assert!(!json);
            }
            _ => panic!("expected trend"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pricecast",
            "forecast",
            "BTC-USD",
            "--horizon",
            "14",
            "--config",
            "/tmp/pc.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pc.toml")));
        assert!(matches!(
            cli.command,
            Commands::Forecast {
                horizon: Some(14),
                ..
            }
        ));
    }

    #[test]
    fn download_symbols_are_validated() {
        let ok = normalize_symbols(&[" spy ".into(), "btc-usd".into()]).unwrap();
        assert_eq!(ok, ["SPY", "BTC-USD"]);

        let err = normalize_symbols(&["SPY".into(), "../secrets".into()]).unwrap_err();
        assert!(err.to_string().starts_with("[PARAM]"), "{err}");
    }

    #[test]
    fn chart_table_lists_every_point() {
        let chart = ChartData {
            title: "AAPL Price Trend".into(),
            x_label: "Days".into(),
            y_label: "Price".into(),
            series: vec![
                LabeledSeries::new("Actual", vec![(0.0, 10.0)]),
                LabeledSeries::new("Prediction", vec![(1.0, 20.5)]),
            ],
        };
        let table = format_chart_table(&chart);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Actual"));
        assert!(lines[2].contains("20.50"));
    }
}

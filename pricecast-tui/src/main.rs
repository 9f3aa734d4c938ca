//! PriceCast TUI: single-screen price trend and forecast charts.
//!
//! Layout:
//! - Form: symbol, chart mode, day sliders, Generate
//! - Chart: the last generated chart
//! - Status bar: progress, warnings and errors
//!
//! A terms overlay gates Generate until accepted once per session.

mod app;
mod input;
mod persistence;
mod theme;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use pricecast_core::{AppConfig, ChartService};

use crate::app::AppState;
use crate::input::Action;

fn main() -> Result<()> {
    let state_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pricecast");
    init_logging(&state_dir)?;

    let config_path = std::env::var_os("PRICECAST_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    let service = ChartService::from_config(&config)?;
    let state_path = state_dir.join("state.json");

    let mut app = AppState::new(&config);
    persistence::apply(&mut app, persistence::load(&state_path));
    tracing::info!(cache_dir = %config.cache_dir.display(), "pricecast tui starting");

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &service);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "failed to save form state");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Logs go to `{config_dir}/pricecast/pricecast.log`; stdout belongs to the
/// alternate screen.
fn init_logging(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("pricecast.log"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    service: &ChartService,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(Action::Generate) = input::handle_key(app, key) {
                    generate(terminal, app, service)?;
                }
            }
        }

        // 3. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

/// Runs one request on the UI thread. The "Fetching..." frame is drawn
/// before the call blocks.
fn generate(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    service: &ChartService,
) -> Result<()> {
    let Some(request) = app.begin_generate() else {
        return Ok(());
    };
    terminal.draw(|f| ui::draw(f, app))?;

    let result = service.handle(&request);
    if let Err(e) = &result {
        tracing::warn!(symbol = request.symbol(), error = %e, "chart request failed");
    }
    app.finish_generate(&request, result);
    Ok(())
}

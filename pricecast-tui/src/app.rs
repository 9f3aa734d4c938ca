//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. Generate requests run synchronously on the
//! UI thread; see `main.rs`.

use std::collections::VecDeque;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use pricecast_core::domain::{is_symbol_char, MAX_SYMBOL_LEN};
use pricecast_core::{AppConfig, ChartRequest, ChartResponse, PricecastError, WindowRequest};

use crate::ui::widgets::SliderState;

const MAX_ERROR_HISTORY: usize = 50;

/// Which chart the Generate button produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Trend,
    Forecast,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Trend => "Trend",
            Mode::Forecast => "Forecast",
        }
    }

    pub fn toggle(self) -> Mode {
        match self {
            Mode::Trend => Mode::Forecast,
            Mode::Forecast => Mode::Trend,
        }
    }
}

/// Focusable form fields, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Symbol,
    Mode,
    ActualDays,
    PredictionDays,
    Horizon,
    Generate,
}

impl Field {
    /// Fields shown for a mode, in focus order.
    pub fn visible(mode: Mode) -> &'static [Field] {
        match mode {
            Mode::Trend => &[
                Field::Symbol,
                Field::Mode,
                Field::ActualDays,
                Field::PredictionDays,
                Field::Generate,
            ],
            Mode::Forecast => &[Field::Symbol, Field::Mode, Field::Horizon, Field::Generate],
        }
    }

    pub fn next(self, mode: Mode) -> Field {
        let fields = Field::visible(mode);
        match fields.iter().position(|&f| f == self) {
            Some(i) => fields[(i + 1) % fields.len()],
            None => fields[0],
        }
    }

    pub fn prev(self, mode: Mode) -> Field {
        let fields = Field::visible(mode);
        match fields.iter().position(|&f| f == self) {
            Some(i) => fields[(i + fields.len() - 1) % fields.len()],
            None => fields[0],
        }
    }
}

/// Form inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub symbol: String,
    pub mode: Mode,
    pub actual_days: SliderState,
    pub prediction_days: SliderState,
    pub horizon_days: SliderState,
    pub focus: Field,
}

impl FormState {
    pub fn from_config(config: &AppConfig) -> Self {
        let w = &config.window;
        let f = &config.forecast;
        Self {
            symbol: String::new(),
            mode: Mode::Trend,
            actual_days: SliderState::new(w.actual_days, 1, w.max_actual_days),
            prediction_days: SliderState::new(w.prediction_days, 1, w.max_prediction_days),
            horizon_days: SliderState::new(
                i64::from(f.horizon_days),
                1,
                i64::from(f.max_horizon_days),
            ),
            focus: Field::Symbol,
        }
    }

    pub fn focused_slider_mut(&mut self) -> Option<&mut SliderState> {
        match self.focus {
            Field::ActualDays => Some(&mut self.actual_days),
            Field::PredictionDays => Some(&mut self.prediction_days),
            Field::Horizon => Some(&mut self.horizon_days),
            _ => None,
        }
    }

    /// Characters that can never appear in a ticker are dropped.
    pub fn push_char(&mut self, c: char) {
        let c = c.to_ascii_uppercase();
        if self.symbol.chars().count() < MAX_SYMBOL_LEN && is_symbol_char(c) {
            self.symbol.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.symbol.pop();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if !Field::visible(mode).contains(&self.focus) {
            self.focus = Field::Mode;
        }
    }

    pub fn request(&self) -> ChartRequest {
        match self.mode {
            Mode::Trend => ChartRequest::Trend {
                symbol: self.symbol.clone(),
                window: WindowRequest::new(self.actual_days.value, self.prediction_days.value),
            },
            Mode::Forecast => ChartRequest::Forecast {
                symbol: self.symbol.clone(),
                horizon_days: u32::try_from(self.horizon_days.value).unwrap_or(0),
            },
        }
    }
}

/// Flags scoped to one run of the TUI. Never written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub terms_accepted: bool,
}

/// Chart area state.
#[derive(Debug, Default)]
pub struct ChartPanelState {
    pub response: Option<ChartResponse>,
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: &'static str,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Terms,
    ErrorHistory,
    Help,
}

pub struct AppState {
    pub running: bool,
    pub form: FormState,
    pub session: Session,
    pub chart: ChartPanelState,
    pub overlay: Overlay,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
}

impl AppState {
    /// Starts with the terms overlay up.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            running: true,
            form: FormState::from_config(config),
            session: Session::default(),
            chart: ChartPanelState::default(),
            overlay: Overlay::Terms,
            status_message: None,
            error_history: VecDeque::with_capacity(MAX_ERROR_HISTORY),
            error_scroll: 0,
        }
    }

    pub fn push_error(&mut self, category: &'static str, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > MAX_ERROR_HISTORY {
            self.error_history.pop_back();
        }
        self.status_message = Some((format!("[{category}] {message}"), StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn accept_terms(&mut self) {
        self.session.terms_accepted = true;
        self.overlay = Overlay::None;
        self.set_status("Terms accepted. Enter a symbol and press Enter to generate.");
    }

    pub fn dismiss_terms(&mut self) {
        self.overlay = Overlay::None;
        if !self.session.terms_accepted {
            self.set_warning("Terms not accepted: Generate is disabled (press t to review)");
        }
    }

    /// The request for the current form, or `None` (with the terms overlay
    /// reopened) if the terms have not been accepted this session.
    pub fn begin_generate(&mut self) -> Option<ChartRequest> {
        if !self.session.terms_accepted {
            self.overlay = Overlay::Terms;
            self.set_warning("Accept the terms to generate charts");
            return None;
        }
        let request = self.form.request();
        self.set_status(format!(
            "Fetching {} ({})...",
            request.symbol().trim().to_uppercase(),
            self.form.mode.label()
        ));
        Some(request)
    }

    pub fn finish_generate(
        &mut self,
        request: &ChartRequest,
        result: Result<ChartResponse, PricecastError>,
    ) {
        match result {
            Ok(response) => {
                if response.partial {
                    self.set_warning(format!(
                        "{}: only {} days of history; chart is partial",
                        response.symbol, response.history_points
                    ));
                } else {
                    self.set_status(format!(
                        "{} ready ({} history points)",
                        response.chart.title, response.history_points
                    ));
                }
                self.chart.response = Some(response);
            }
            Err(e) => {
                self.chart.response = None;
                let context = format!("{} {}", self.form.mode.label(), request.symbol().trim());
                self.push_error(e.category(), e.to_string(), context);
            }
        }
    }
}

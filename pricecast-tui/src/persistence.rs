//! Form persistence: JSON save/load across restarts.
//!
//! Only form inputs are stored. Terms acceptance is per session and never
//! written here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::{AppState, Mode};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub symbol: String,
    pub mode: Mode,
    pub actual_days: Option<i64>,
    pub prediction_days: Option<i64>,
    pub horizon_days: Option<i64>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            mode: Mode::Trend,
            actual_days: None,
            prediction_days: None,
            horizon_days: None,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    let form = &app.form;
    PersistedState {
        symbol: form.symbol.clone(),
        mode: form.mode,
        actual_days: Some(form.actual_days.value),
        prediction_days: Some(form.prediction_days.value),
        horizon_days: Some(form.horizon_days.value),
    }
}

/// Values outside the configured slider bounds are clamped.
pub fn apply(app: &mut AppState, state: PersistedState) {
    let form = &mut app.form;
    form.symbol.clear();
    for c in state.symbol.chars() {
        form.push_char(c);
    }
    form.set_mode(state.mode);
    if let Some(v) = state.actual_days {
        form.actual_days.set(v);
    }
    if let Some(v) = state.prediction_days {
        form.prediction_days.set(v);
    }
    if let Some(v) = state.horizon_days {
        form.horizon_days.set(v);
    }
}

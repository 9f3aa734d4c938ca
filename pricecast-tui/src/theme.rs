//! Parrot/neon theme tokens for the PriceCast TUI
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, the Actual line)
//! - **Positive**: Neon green (third chart series)
//! - **Negative**: Hot pink (errors)
//! - **Warning**: Neon orange (warnings, the Prediction/Forecast line)
//! - **Neutral**: Cool purple (labels)
//! - **Muted**: Steel blue (hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub const fn parrot_neon() -> Self {
        Self {
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
        }
    }

    /// Line color for the n-th chart series.
    pub fn series_color(&self, index: usize) -> Color {
        match index % 4 {
            0 => self.accent,
            1 => self.warning,
            2 => self.positive,
            _ => self.neutral,
        }
    }
}

const THEME: Theme = Theme::parrot_neon();

pub fn theme() -> Theme {
    THEME
}

pub fn accent() -> Style {
    Style::default().fg(THEME.accent)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn negative() -> Style {
    Style::default().fg(THEME.negative)
}

pub fn warning() -> Style {
    Style::default().fg(THEME.warning)
}

pub fn neutral() -> Style {
    Style::default().fg(THEME.neutral)
}

pub fn muted() -> Style {
    Style::default().fg(THEME.muted)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        neutral()
    }
}

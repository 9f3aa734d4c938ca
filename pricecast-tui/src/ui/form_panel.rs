//! Left column: symbol box, mode toggle, sliders, Generate button.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, Field, Mode};
use crate::theme;
use crate::ui::widgets::slider_line;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let form = &app.form;
    // Label column, brackets, value and range take roughly 34 columns.
    let track_width = (area.width as usize).saturating_sub(34).clamp(4, 40);
    let mut lines: Vec<Line> = vec![Line::from("")];

    for &field in Field::visible(form.mode) {
        let focused = form.focus == field;
        let line = match field {
            Field::Symbol => symbol_line(&form.symbol, focused),
            Field::Mode => mode_line(form.mode, focused),
            Field::ActualDays => {
                slider_line("Actual days", &form.actual_days, track_width, focused)
            }
            Field::PredictionDays => {
                slider_line("Prediction days", &form.prediction_days, track_width, focused)
            }
            Field::Horizon => {
                slider_line("Horizon (days)", &form.horizon_days, track_width, focused)
            }
            Field::Generate => generate_line(focused, app.session.terms_accepted),
        };
        lines.push(line);
        lines.push(Line::from(""));
    }

    if !app.session.terms_accepted {
        lines.push(Line::from(Span::styled(
            "Terms not accepted this session (press t outside the symbol box)",
            theme::warning(),
        )));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn label_style(focused: bool) -> ratatui::style::Style {
    if focused {
        theme::accent().add_modifier(Modifier::REVERSED)
    } else {
        theme::neutral()
    }
}

fn symbol_line(symbol: &str, focused: bool) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{:<18}", "Symbol"), label_style(focused)),
        Span::raw(" "),
    ];
    if symbol.is_empty() && !focused {
        spans.push(Span::styled("e.g. AAPL, BTC-USD", theme::muted()));
    } else {
        spans.push(Span::styled(symbol.to_string(), theme::accent_bold()));
    }
    if focused {
        spans.push(Span::styled("_", theme::accent()));
    }
    Line::from(spans)
}

fn mode_line(mode: Mode, focused: bool) -> Line<'static> {
    let option = |m: Mode| {
        if m == mode {
            Span::styled(format!("({}) ", m.label()), theme::accent_bold())
        } else {
            Span::styled(format!(" {}  ", m.label()), theme::muted())
        }
    };
    Line::from(vec![
        Span::styled(format!("{:<18}", "Chart"), label_style(focused)),
        Span::raw(" "),
        option(Mode::Trend),
        option(Mode::Forecast),
    ])
}

fn generate_line(focused: bool, enabled: bool) -> Line<'static> {
    let style = match (focused, enabled) {
        (_, false) => theme::muted(),
        (true, true) => theme::accent_bold().add_modifier(Modifier::REVERSED),
        (false, true) => theme::accent(),
    };
    Line::from(vec![
        Span::raw(" ".repeat(19)),
        Span::styled("[ Generate ]", style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn empty_symbol_shows_placeholder_when_unfocused() {
        assert!(text(&symbol_line("", false)).contains("e.g. AAPL"));
        assert!(!text(&symbol_line("", true)).contains("e.g. AAPL"));
        assert!(text(&symbol_line("SPY", true)).ends_with("SPY_"));
    }

    #[test]
    fn mode_line_marks_selected() {
        let line = text(&mode_line(Mode::Forecast, false));
        assert!(line.contains("(Forecast)"));
        assert!(!line.contains("(Trend)"));
    }
}

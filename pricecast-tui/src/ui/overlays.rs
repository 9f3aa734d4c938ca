//! Overlay widgets: terms gate, error history, key help.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

/// Terms of use, shown until accepted once per session.
pub fn render_terms(f: &mut Frame, area: Rect) {
    let popup = centered_rect(64, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::warning())
        .title(" Terms of Use ")
        .title_style(theme::warning().add_modifier(Modifier::BOLD));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "PriceCast is for informational and educational use only.",
            theme::accent_bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Charts are not investment advice. Price data comes from a third-party \
             provider and may be delayed, incomplete or wrong.",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "The Trend chart's \"Prediction\" line is the most recent historical \
             prices, not a model output. Forecasts extrapolate past prices and \
             say nothing reliable about the future.",
            theme::muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y/Enter] ", theme::accent_bold()),
            Span::styled("accept    ", theme::neutral()),
            Span::styled("[Esc/n] ", theme::accent_bold()),
            Span::styled("not now", theme::neutral()),
        ]),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Key reference.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Help [any key]close ")
        .title_style(theme::accent_bold());

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Form");
    key(&mut lines, "Tab / Down", "Next field");
    key(&mut lines, "Shift+Tab / Up", "Previous field");
    key(&mut lines, "Esc", "Back to the symbol box");
    key(&mut lines, "Enter", "Generate the chart");
    lines.push(Line::from(""));

    section(&mut lines, "Sliders");
    key(&mut lines, "Left / Right", "Step by one day");
    key(&mut lines, "PgDn / PgUp", "Step by ten days");
    key(&mut lines, "Home / End", "Jump to minimum / maximum");
    lines.push(Line::from(""));

    section(&mut lines, "Outside the symbol box");
    key(&mut lines, "Space", "Toggle Trend / Forecast on the mode field");
    key(&mut lines, "g", "Generate");
    key(&mut lines, "e", "Error history");
    key(&mut lines, "t", "Review terms");
    key(&mut lines, "q", "Quit");
    key(&mut lines, "Ctrl+C", "Quit from anywhere");
    lines.push(Line::from(""));

    section(&mut lines, "Charts");
    key(&mut lines, "Trend", "Last N days as Actual, the M days after as Prediction");
    key(&mut lines, "", "Prediction is recent history, not a model output");
    key(&mut lines, "Forecast", "Full history plus a Holt trend forecast");

    let para = Paragraph::new(lines).block(block);
    f.render_widget(para, popup);
}

fn section(lines: &mut Vec<Line<'static>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'static>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}

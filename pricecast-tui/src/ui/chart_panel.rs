//! Right column: the generated line chart, one dataset per series.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph};

use pricecast_core::{ChartData, ChartResponse};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    match &app.chart.response {
        Some(resp) if !resp.chart.is_empty() => render_response(f, area, resp),
        _ => render_empty(f, area, app.session.terms_accepted),
    }
}

fn render_empty(f: &mut Frame, area: Rect, terms_accepted: bool) {
    let hint = if terms_accepted {
        "Enter a symbol and press Enter to generate a chart."
    } else {
        "Accept the terms of use to start generating charts."
    };
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(hint, theme::muted())),
        Line::from(""),
        Line::from(Span::styled("Press ? for keys.", theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_response(f: &mut Frame, area: Rect, resp: &ChartResponse) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let header = if resp.partial {
        Line::from(vec![
            Span::styled(format!("{}  ", resp.chart.title), theme::accent_bold()),
            Span::styled(
                format!(
                    "partial: only {} days of history available",
                    resp.history_points
                ),
                theme::warning(),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(format!("{}  ", resp.chart.title), theme::accent_bold()),
            Span::styled(format!("{} history points", resp.history_points), theme::muted()),
        ])
    };
    f.render_widget(Paragraph::new(header), chunks[0]);
    render_chart(f, chunks[1], &resp.chart);
}

fn render_chart(f: &mut Frame, area: Rect, chart: &ChartData) {
    let palette = theme::theme();
    let datasets: Vec<Dataset> = chart
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.points.is_empty())
        .map(|(i, s)| {
            Dataset::default()
                .name(s.label.clone())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(palette.series_color(i)))
                .graph_type(GraphType::Line)
                .data(&s.points)
        })
        .collect();

    let [x_min, x_max] = chart.x_bounds().unwrap_or([0.0, 1.0]);
    let [y_min, y_max] = padded(chart.y_bounds().unwrap_or([0.0, 1.0]));
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };

    let widget = Chart::new(datasets)
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .title(Span::styled(chart.x_label.clone(), theme::muted()))
                .style(theme::muted())
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::styled(format!("{x_min:.0}"), theme::muted()),
                    Span::styled(format!("{:.0}", (x_min + x_max) / 2.0), theme::muted()),
                    Span::styled(format!("{x_max:.0}"), theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(chart.y_label.clone(), theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{:.2}", (y_min + y_max) / 2.0), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(widget, area);
}

/// 5% headroom on each side; a flat series gets a unit band.
fn padded([lo, hi]: [f64; 2]) -> [f64; 2] {
    let span = hi - lo;
    if span <= f64::EPSILON {
        return [lo - 1.0, hi + 1.0];
    }
    let pad = span * 0.05;
    [lo - pad, hi + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_gets_band() {
        assert_eq!(padded([5.0, 5.0]), [4.0, 6.0]);
        let [lo, hi] = padded([0.0, 100.0]);
        assert!((lo + 5.0).abs() < 1e-9 && (hi - 105.0).abs() < 1e-9);
    }
}

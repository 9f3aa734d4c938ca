//! Top-level UI layout: form and chart side by side, status bar below.

pub mod chart_panel;
pub mod form_panel;
pub mod overlays;
pub mod status_bar;
pub mod widgets;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

use crate::app::{AppState, Overlay};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(64), Constraint::Min(20)])
        .split(main_area);

    let form_inner = panel(f, columns[0], " PriceCast ", app.overlay == Overlay::None);
    form_panel::render(f, form_inner, app);

    let chart_title = match &app.chart.response {
        Some(resp) => format!(" Chart: {} ", resp.symbol),
        None => " Chart ".to_string(),
    };
    let chart_inner = panel(f, columns[1], &chart_title, false);
    chart_panel::render(f, chart_inner, app);

    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Terms => overlays::render_terms(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::None => {}
    }
}

/// Bordered panel; returns the inner area.
fn panel(f: &mut Frame, area: Rect, title: &str, active: bool) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(title.to_string())
        .title_style(theme::panel_title(active));

    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use pricecast_core::{align, AppConfig, ChartDetail, ChartResponse, PriceSeries, WindowRequest};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn first_frame_shows_terms() {
        let app = AppState::new(&AppConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("Terms of Use"));
    }

    #[test]
    fn draws_generated_chart() {
        let mut app = AppState::new(&AppConfig::default());
        app.accept_terms();
        let aligned = align(
            &PriceSeries::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            WindowRequest::new(5, 2),
        )
        .unwrap();
        app.chart.response = Some(ChartResponse {
            symbol: "AAPL".into(),
            chart: aligned.to_chart("AAPL"),
            partial: false,
            detail: ChartDetail::Trend(aligned),
            history_points: 7,
        });

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("AAPL Price Trend"));
        assert!(text.contains("Actual days"));
        assert!(!text.contains("Terms of Use"));
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(60, 40, area);
        assert!(r.x >= 20 && r.right() <= 80);
        assert!(r.y >= 15 && r.bottom() <= 35);
    }
}

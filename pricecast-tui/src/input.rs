//! Keyboard input dispatch: quit keys → overlays → form field handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Field, Overlay};

const PAGE_STEP: i64 = 10;

/// Work the event loop has to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
}

pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.running = false;
        return None;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Terms => {
            handle_terms_overlay(app, key);
            return None;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return None;
        }
        Overlay::Help => {
            app.overlay = Overlay::None;
            return None;
        }
        Overlay::None => {}
    }

    // 2. Focus movement.
    let mode = app.form.mode;
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            app.form.focus = app.form.focus.next(mode);
            return None;
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.focus = app.form.focus.prev(mode);
            return None;
        }
        KeyCode::Esc => {
            app.form.focus = Field::Symbol;
            return None;
        }
        _ => {}
    }

    // 3. The symbol box takes printable keys as text.
    if app.form.focus == Field::Symbol {
        return handle_symbol_key(app, key);
    }

    // 4. Global keys outside the text box.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return None;
        }
        KeyCode::Char('g') => return Some(Action::Generate),
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return None;
        }
        KeyCode::Char('t') => {
            app.overlay = Overlay::Terms;
            return None;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return None;
        }
        _ => {}
    }

    match app.form.focus {
        Field::Mode => handle_mode_key(app, key),
        Field::ActualDays | Field::PredictionDays | Field::Horizon => handle_slider_key(app, key),
        Field::Generate => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Generate),
            _ => None,
        },
        Field::Symbol => None,
    }
}

fn handle_terms_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.accept_terms(),
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => app.dismiss_terms(),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_symbol_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => Some(Action::Generate),
        KeyCode::Backspace => {
            app.form.pop_char();
            None
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.form.push_char(c);
            None
        }
        _ => None,
    }
}

fn handle_mode_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char(' ')
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Char('h')
        | KeyCode::Char('l') => {
            let mode = app.form.mode.toggle();
            app.form.set_mode(mode);
            None
        }
        KeyCode::Enter => Some(Action::Generate),
        _ => None,
    }
}

fn handle_slider_key(app: &mut AppState, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Enter {
        return Some(Action::Generate);
    }
    let slider = app.form.focused_slider_mut()?;
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => slider.step(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => slider.step(1),
        KeyCode::PageDown => slider.step(-PAGE_STEP),
        KeyCode::PageUp => slider.step(PAGE_STEP),
        KeyCode::Home => slider.to_min(),
        KeyCode::End => slider.to_max(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Mode;
    use pricecast_core::AppConfig;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready_app() -> AppState {
        let mut app = AppState::new(&AppConfig::default());
        app.accept_terms();
        app
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            handle_key(app, press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn terms_overlay_swallows_keys_until_answered() {
        let mut app = AppState::new(&AppConfig::default());
        assert_eq!(app.overlay, Overlay::Terms);
        type_str(&mut app, "aapl");
        assert!(app.form.symbol.is_empty());
        assert_eq!(app.overlay, Overlay::Terms);

        handle_key(&mut app, press(KeyCode::Char('y')));
        assert!(app.session.terms_accepted);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn dismissed_terms_reopen_on_generate() {
        let mut app = AppState::new(&AppConfig::default());
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
        assert!(!app.session.terms_accepted);

        // The key still signals Generate; the app refuses it.
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), Some(Action::Generate));
        assert!(app.begin_generate().is_none());
        assert_eq!(app.overlay, Overlay::Terms);
    }

    #[test]
    fn q_is_text_in_symbol_box() {
        let mut app = ready_app();
        type_str(&mut app, "qqq");
        assert!(app.running);
        assert_eq!(app.form.symbol, "QQQ");
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.form.symbol, "QQ");

        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn ctrl_c_quits_from_overlay() {
        let mut app = AppState::new(&AppConfig::default());
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn sliders_step_and_clamp() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Tab)); // Mode
        handle_key(&mut app, press(KeyCode::Tab)); // ActualDays
        assert_eq!(app.form.focus, Field::ActualDays);

        handle_key(&mut app, press(KeyCode::Right));
        assert_eq!(app.form.actual_days.value, 61);
        handle_key(&mut app, press(KeyCode::PageDown));
        assert_eq!(app.form.actual_days.value, 51);
        handle_key(&mut app, press(KeyCode::End));
        assert_eq!(app.form.actual_days.value, 365);
        handle_key(&mut app, press(KeyCode::Right));
        assert_eq!(app.form.actual_days.value, 365);

        handle_key(&mut app, press(KeyCode::Tab)); // PredictionDays
        handle_key(&mut app, press(KeyCode::Home));
        handle_key(&mut app, press(KeyCode::Left));
        assert_eq!(app.form.prediction_days.value, 1);
    }

    #[test]
    fn mode_toggle_shows_horizon() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.form.focus, Field::Mode);
        handle_key(&mut app, press(KeyCode::Char(' ')));
        assert_eq!(app.form.mode, Mode::Forecast);
        handle_key(&mut app, press(KeyCode::Down));
        assert_eq!(app.form.focus, Field::Horizon);
        handle_key(&mut app, press(KeyCode::PageUp));
        assert_eq!(app.form.horizon_days.value, 40);
    }

    #[test]
    fn generate_keys() {
        let mut app = ready_app();
        type_str(&mut app, "spy");
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), Some(Action::Generate));
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.form.focus, Field::Generate);
        assert_eq!(handle_key(&mut app, press(KeyCode::Char(' '))), Some(Action::Generate));
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('g'))), Some(Action::Generate));
    }

    #[test]
    fn overlays_open_and_close() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, press(KeyCode::Char('e')));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
        handle_key(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.overlay, Overlay::Help);
        handle_key(&mut app, press(KeyCode::Char('x')));
        assert_eq!(app.overlay, Overlay::None);
    }
}

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

use super::plain;

/// Filter-entry mode: printables and Backspace edit the buffer, Enter
/// applies, Esc clears. Everything else — hotkeys included — is
/// swallowed so typing can't fall through to navigation.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if plain(&key) => {
            app.filter.input.push(c);
            app.refresh();
        }
        KeyCode::Backspace => {
            app.filter.input.pop();
            app.refresh();
        }
        KeyCode::Enter => {
            app.filter.entering = false;
            let input = app.filter.input.trim().to_string();
            app.filter.applied = if input.is_empty() { None } else { Some(input) };
            app.refresh();
        }
        KeyCode::Esc => {
            app.filter.clear();
            app.refresh();
        }
        _ => {}
    }
}

/// Enter filter-entry state, seeding from an already-applied filter
pub fn start(app: &mut App) {
    app.filter.entering = true;
    app.filter.input = app.filter.applied.clone().unwrap_or_default();
}

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::actions::{dispatch, panel_actions};
use crate::tui::app::{App, PanelKind};

/// Map a global opener key to its panel kind
pub fn opener(c: char) -> Option<PanelKind> {
    match c {
        'g' => Some(PanelKind::Nav),
        'a' => Some(PanelKind::Agenda),
        'c' => Some(PanelKind::Capture),
        'x' => Some(PanelKind::Context),
        _ => None,
    }
}

/// Keys inside the action-panel modal. Opener keys stack further
/// panels; a key in the top panel's map executes its action and closes
/// the whole stack; unmapped keys are ignored.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.pop_panel(),
        KeyCode::Char('g') if key.modifiers == crossterm::event::KeyModifiers::CONTROL => {
            // Ctrl+G cancels the whole stack
            app.modal = None;
        }
        KeyCode::Char(c) if super::plain(&key) => {
            let Some(stack) = app.panel_stack() else {
                return;
            };
            let top = *stack.last().expect("panel stack is never empty");
            // An opener pushes, unless its panel is already stacked; then
            // it falls through so the panel's own map can claim the key
            if let Some(kind) = opener(c) {
                if !stack.contains(&kind) {
                    app.open_panel(kind);
                    return;
                }
            }
            let action = panel_actions(app, top)
                .iter()
                .find(|(k, _, _)| *k == c)
                .map(|(_, a, _)| *a);
            if let Some(action) = action {
                // Executing closes the entire stack, then dispatches
                app.modal = None;
                dispatch(app, action);
            }
        }
        _ => {}
    }
}

mod capture;
mod filter;
mod item;
mod lists;
mod modal;
mod outline;
mod panel;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::actions::Action;
use super::app::{App, Modal, View};

/// Route a key by precedence: filter entry, then the open modal (the
/// action panel included), then the capture draft, then global hotkeys,
/// then the view handler.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    // The minibuffer is transient: any key clears the previous notice
    app.minibuffer = None;

    if app.filter.entering {
        filter::handle(app, key);
        return;
    }
    if matches!(app.modal, Some(Modal::ActionPanel { .. })) {
        panel::handle(app, key);
        return;
    }
    if app.modal.is_some() {
        modal::handle(app, key);
        return;
    }
    // The capture draft captures printables like a modal editor
    if app.view == View::Capture {
        capture::handle(app, key);
        return;
    }

    if key.modifiers.is_empty() {
        if let KeyCode::Char(c) = key.code {
            if let Some(kind) = panel::opener(c) {
                app.open_panel(kind);
                return;
            }
            if c == 'q' {
                app.request_quit();
                return;
            }
        }
    }

    match app.view {
        View::Outline => outline::handle(app, key),
        View::Item => item::handle(app, key),
        View::ProjectList | View::OutlineList | View::Archived | View::Agenda => {
            lists::handle(app, key)
        }
        View::Capture => {}
    }
}

/// Direct single-key shortcuts available in the item/outline views.
/// This is the full vocabulary; read-only suppression happens in
/// `actions::dispatch` so the press still produces a notice.
pub(super) fn shortcut_action(c: char) -> Option<Action> {
    match c {
        'e' => Some(Action::EditTitle),
        'D' => Some(Action::EditDescription),
        'C' => Some(Action::AddComment),
        'R' => Some(Action::ReplyOrArchive),
        'p' => Some(Action::TogglePriority),
        'h' => Some(Action::ToggleOnHold),
        's' => Some(Action::PickStatus),
        'A' => Some(Action::Assign),
        'V' => Some(Action::Duplicate),
        'y' => Some(Action::Copy),
        'l' => Some(Action::Links),
        'o' => Some(Action::TogglePreview),
        _ => None,
    }
}

/// True for plain presses (no ctrl/alt); shift is part of key identity
pub(super) fn plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[cfg(test)]
pub(crate) fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[cfg(test)]
pub(crate) fn press_char(c: char) -> KeyEvent {
    let mods = if c.is_uppercase() {
        KeyModifiers::SHIFT
    } else {
        KeyModifiers::NONE
    };
    KeyEvent::new(KeyCode::Char(c), mods)
}

#[cfg(test)]
pub(crate) fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::pipeline::{Mutation, Position};
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::app::PanelKind;
    use tempfile::TempDir;

    fn app_with_item(tmp: &TempDir) -> (App, String) {
        let mut app = test_app(tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "alpha".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.refresh();
        (app, item)
    }

    #[test]
    fn panel_stack_push_pop_sequence() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _) = app_with_item(&tmp);
        assert_eq!(app.view, View::Outline);
        handle_key(&mut app, press_char('x'));
        assert_eq!(app.panel_stack(), Some(&[PanelKind::Context][..]));
        handle_key(&mut app, press_char('g'));
        assert_eq!(
            app.panel_stack(),
            Some(&[PanelKind::Context, PanelKind::Nav][..])
        );
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.panel_stack(), Some(&[PanelKind::Context][..]));
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert_eq!(app.view, View::Outline);
    }

    #[test]
    fn panel_executes_global_action_and_closes() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _) = app_with_item(&tmp);
        assert!(!app.show_preview);
        handle_key(&mut app, press_char('x'));
        handle_key(&mut app, press_char('o'));
        assert!(app.show_preview);
        assert!(app.modal.is_none());
    }

    #[test]
    fn filter_mode_captures_letters() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _) = app_with_item(&tmp);
        handle_key(&mut app, press_char('/'));
        assert!(app.filter.entering);
        for c in ['a', 'q', '\u{8}', 'r'] {
            if c == '\u{8}' {
                handle_key(&mut app, press(KeyCode::Backspace));
            } else {
                handle_key(&mut app, press_char(c));
            }
        }
        assert_eq!(app.filter.input, "ar");
        assert_eq!(app.view, View::Outline);
        assert!(app.modal.is_none());
        assert!(!app.should_quit);
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(!app.filter.entering);
        assert_eq!(app.filter.applied.as_deref(), Some("ar"));
    }

    #[test]
    fn duplicate_shortcut_in_outline_view() {
        let tmp = TempDir::new().unwrap();
        let (mut app, item) = app_with_item(&tmp);
        app.mutate(Mutation::SetStatus {
            id: item.clone(),
            status_id: "doing".into(),
        });
        app.mutate(Mutation::TogglePriority { id: item.clone() });
        handle_key(&mut app, press_char('V'));
        assert_eq!(app.view, View::Outline);
        let items: Vec<_> = app.ws.snapshot.items.values().collect();
        assert_eq!(items.len(), 2);
        let copy = items.iter().find(|i| i.id != item).unwrap();
        assert_eq!(copy.title, "alpha");
        assert_eq!(copy.status_id, "todo");
        assert!(!copy.priority);
    }

    #[test]
    fn read_only_item_view_from_archived() {
        let tmp = TempDir::new().unwrap();
        let (mut app, item) = app_with_item(&tmp);
        app.mutate(Mutation::ArchiveSubtree { id: item.clone() });
        crate::tui::actions::dispatch(&mut app, Action::GoArchived);
        assert_eq!(app.view, View::Archived);
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.view, View::Item);
        assert!(app.read_only);
        assert_eq!(app.return_view, Some(View::Archived));

        // Mutating press suppressed with a notice, no snapshot change
        let before = app.ws.snapshot.item(&item).unwrap().clone();
        handle_key(&mut app, press_char('e'));
        assert!(app.minibuffer.as_deref().unwrap().contains("read-only"));
        assert!(app.modal.is_none());
        assert_eq!(app.ws.snapshot.item(&item).unwrap(), &before);

        // The action map keeps copy and drops edit
        let map = crate::tui::actions::context_actions(&app);
        assert!(map.iter().any(|(c, _, _)| *c == 'y'));
        assert!(!map.iter().any(|(c, _, _)| *c == 'e'));

        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.view, View::Archived);
    }
}

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::actions::{self, Action};
use crate::tui::app::{App, EditState, ItemFocus, Modal, TitleTarget};

use super::shortcut_action;

/// Keys in the item view. Tab cycles the focus ring; j/k move within
/// the children and comments regions; Enter acts on the focused field.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.item_focus = app.item_focus.next(),
        KeyCode::BackTab => app.item_focus = app.item_focus.prev(),
        KeyCode::Esc => app.close_item(),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(app, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(app, -1),
        KeyCode::Enter => activate(app),
        KeyCode::Char(c) if super::plain(&key) => {
            if let Some(action) = shortcut_action(c) {
                actions::dispatch(app, action);
            }
        }
        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    match app.item_focus {
        ItemFocus::Children => {
            let count = app.item_rows.len().saturating_sub(1);
            app.child_cursor = step(app.child_cursor, delta, count);
        }
        ItemFocus::Comments => {
            let count = app
                .open_item_id
                .as_ref()
                .map(|id| app.comment_thread(id).len())
                .unwrap_or(0);
            app.comment_cursor = step(app.comment_cursor, delta, count);
        }
        _ => {}
    }
}

fn step(cursor: usize, delta: isize, count: usize) -> usize {
    if delta > 0 {
        if cursor + 1 < count { cursor + 1 } else { cursor }
    } else {
        cursor.saturating_sub(1)
    }
}

fn activate(app: &mut App) {
    let Some(item_id) = app.open_item_id.clone() else {
        return;
    };
    match app.item_focus {
        ItemFocus::Title => {
            if app.read_only {
                return;
            }
            let title = app
                .ws
                .snapshot
                .item(&item_id)
                .map(|i| i.title.clone())
                .unwrap_or_default();
            app.modal = Some(Modal::EditTitle {
                target: TitleTarget::Item(item_id),
                edit: EditState::with_text(title),
            });
        }
        ItemFocus::Status => actions::dispatch(app, Action::PickStatus),
        ItemFocus::Priority => actions::dispatch(app, Action::TogglePriority),
        ItemFocus::Description => {
            let Some(item) = app.ws.snapshot.item(&item_id) else {
                return;
            };
            if app.read_only {
                app.modal = Some(Modal::ViewEntry {
                    title: item.title.clone(),
                    body: item.description.clone(),
                });
            } else {
                let edit = EditState::with_text(item.description.clone());
                app.modal = Some(Modal::EditDescription { item_id, edit });
            }
        }
        ItemFocus::Children => {
            if let Some(child_id) = app.selected_child().map(String::from) {
                app.open_item(child_id, app.read_only);
            }
        }
        ItemFocus::Comments => {
            if let Some(comment_id) = app.selected_comment() {
                if let Some(comment) = app.ws.snapshot.comment(&comment_id) {
                    let author = app
                        .ws
                        .snapshot
                        .actor(&comment.author_id)
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| comment.author_id.clone());
                    app.modal = Some(Modal::ViewEntry {
                        title: author,
                        body: comment.body.clone(),
                    });
                }
            }
        }
    }
}

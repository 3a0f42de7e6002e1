use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::pipeline::{Mutation, Position};
use crate::tui::app::{App, EditState, Modal, TitleTarget, View};
use crate::util::text::{next_boundary, prev_boundary};

use super::plain;

/// Keys while a (non-panel) modal is open. Esc and Ctrl+G cancel;
/// Enter confirms single-line modals; Ctrl+S submits multi-line ones.
pub fn handle(app: &mut App, key: KeyEvent) {
    if is_cancel(&key) {
        app.modal = None;
        return;
    }
    let Some(modal) = app.modal.take() else {
        return;
    };
    match modal {
        Modal::EditTitle { target, mut edit } => {
            if key.code == KeyCode::Enter {
                confirm_title(app, target, edit.buffer);
            } else {
                edit_key(&mut edit, &key);
                app.modal = Some(Modal::EditTitle { target, edit });
            }
        }
        Modal::EditDescription { item_id, mut edit } => {
            if is_submit(&key) {
                app.mutate(Mutation::EditItem {
                    id: item_id,
                    title: None,
                    description: Some(edit.buffer),
                    tags: None,
                });
            } else {
                multiline_key(&mut edit, &key);
                app.modal = Some(Modal::EditDescription { item_id, edit });
            }
        }
        Modal::AddComment { item_id, mut edit } => {
            if is_submit(&key) {
                if app
                    .mutate(Mutation::CreateComment {
                        item_id: item_id.clone(),
                        body: edit.buffer.clone(),
                        reply_to: None,
                    })
                    .is_none()
                    && !app.read_only
                {
                    // Validation notice already shown; keep the draft
                    app.modal = Some(Modal::AddComment { item_id, edit });
                }
            } else {
                multiline_key(&mut edit, &key);
                app.modal = Some(Modal::AddComment { item_id, edit });
            }
        }
        Modal::ReplyComment {
            item_id,
            parent_id,
            mut edit,
        } => {
            if is_submit(&key) {
                if app
                    .mutate(Mutation::CreateComment {
                        item_id: item_id.clone(),
                        body: edit.buffer.clone(),
                        reply_to: Some(parent_id.clone()),
                    })
                    .is_none()
                    && !app.read_only
                {
                    app.modal = Some(Modal::ReplyComment {
                        item_id,
                        parent_id,
                        edit,
                    });
                }
            } else {
                multiline_key(&mut edit, &key);
                app.modal = Some(Modal::ReplyComment {
                    item_id,
                    parent_id,
                    edit,
                });
            }
        }
        Modal::ViewEntry { .. } => {
            // Any confirm-ish key closes; others keep it open
            if !matches!(key.code, KeyCode::Enter | KeyCode::Char('q')) {
                app.modal = Some(modal);
            }
        }
        Modal::PickStatus { item_id, mut pick } => match key.code {
            KeyCode::Enter => {
                if let Some((status_id, _)) = pick.options.get(pick.cursor).cloned() {
                    app.mutate(Mutation::SetStatus { id: item_id, status_id });
                }
            }
            _ => {
                pick_key(&mut pick, &key);
                app.modal = Some(Modal::PickStatus { item_id, pick });
            }
        },
        Modal::PickAssignee { item_id, mut pick } => match key.code {
            KeyCode::Enter => {
                if let Some((actor_id, _)) = pick.options.get(pick.cursor).cloned() {
                    let assigned = app
                        .ws
                        .snapshot
                        .item(&item_id)
                        .is_some_and(|i| i.assignee_actor_ids.contains(&actor_id));
                    let mutation = if assigned {
                        Mutation::Unassign { id: item_id, actor_id }
                    } else {
                        Mutation::Assign { id: item_id, actor_id }
                    };
                    app.mutate(mutation);
                }
            }
            _ => {
                pick_key(&mut pick, &key);
                app.modal = Some(Modal::PickAssignee { item_id, pick });
            }
        },
        Modal::PickTargets { item_id, mut pick } => match key.code {
            KeyCode::Enter => {
                if let Some((attachment_id, _)) = pick.options.get(pick.cursor) {
                    if let Some(att) = app.ws.snapshot.attachment(attachment_id) {
                        app.modal = Some(Modal::ViewEntry {
                            title: att.original_name.clone(),
                            body: format!("{} bytes\n{}", att.size_bytes, att.path),
                        });
                    }
                }
            }
            _ => {
                pick_key(&mut pick, &key);
                app.modal = Some(Modal::PickTargets { item_id, pick });
            }
        },
        Modal::ConfirmArchive { item_id } => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => {
                let was_open = app.open_item_id.as_deref() == Some(item_id.as_str());
                if let Some(applied) = app.mutate(Mutation::ArchiveSubtree { id: item_id }) {
                    app.notify(format!("archived {} item(s)", applied.affected));
                    if was_open && app.view == View::Item {
                        app.leave_archived_item();
                    }
                }
            }
            KeyCode::Char('n') => {}
            _ => app.modal = Some(Modal::ConfirmArchive { item_id }),
        },
        Modal::ConfirmExit => match key.code {
            KeyCode::Enter | KeyCode::Char('y') => app.should_quit = true,
            KeyCode::Char('n') => {}
            _ => app.modal = Some(Modal::ConfirmExit),
        },
        Modal::ActionPanel { .. } => {
            // Routed to the panel handler before this point
            app.modal = Some(modal);
        }
    }
}

fn confirm_title(app: &mut App, target: TitleTarget, title: String) {
    if title.trim().is_empty() {
        app.notify("title is empty");
        return;
    }
    match target {
        TitleTarget::Item(id) => {
            app.mutate(Mutation::EditItem {
                id,
                title: Some(title),
                description: None,
                tags: None,
            });
        }
        TitleTarget::NewItem {
            outline_id,
            parent_id,
        } => {
            app.mutate(Mutation::CreateItem {
                outline_id,
                parent_id,
                title,
                description: String::new(),
                position: Position::End,
            });
        }
        TitleTarget::NewProject => {
            if let Some(applied) = app.mutate(Mutation::CreateProject { name: title }) {
                if let Some(id) = applied.created_id {
                    app.open_project(id);
                }
            }
        }
        TitleTarget::NewOutline { project_id } => {
            if let Some(applied) = app.mutate(Mutation::CreateOutline {
                project_id,
                description: title,
            }) {
                if let Some(id) = applied.created_id {
                    app.open_outline(id);
                }
            }
        }
    }
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('g') && key.modifiers == KeyModifiers::CONTROL)
}

fn is_submit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('s') && key.modifiers == KeyModifiers::CONTROL
}

/// Single-line editing: printables, Backspace, Left/Right/Home/End
fn edit_key(edit: &mut EditState, key: &KeyEvent) {
    match key.code {
        KeyCode::Char(c) if plain(key) => {
            edit.buffer.insert(edit.cursor, c);
            edit.cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            if edit.cursor > 0 {
                let start = prev_boundary(&edit.buffer, edit.cursor);
                edit.buffer.replace_range(start..edit.cursor, "");
                edit.cursor = start;
            }
        }
        KeyCode::Left => edit.cursor = prev_boundary(&edit.buffer, edit.cursor),
        KeyCode::Right => {
            if edit.cursor < edit.buffer.len() {
                edit.cursor = next_boundary(&edit.buffer, edit.cursor);
            }
        }
        KeyCode::Home => edit.cursor = 0,
        KeyCode::End => edit.cursor = edit.buffer.len(),
        _ => {}
    }
}

/// Multi-line editing: Enter inserts a newline, the rest as single-line
fn multiline_key(edit: &mut EditState, key: &KeyEvent) {
    if key.code == KeyCode::Enter {
        edit.buffer.insert(edit.cursor, '\n');
        edit.cursor += 1;
    } else {
        edit_key(edit, key);
    }
}

/// Picker movement: j/k and arrows
fn pick_key(pick: &mut crate::tui::app::PickState, key: &KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if pick.cursor + 1 < pick.options.len() {
                pick.cursor += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            pick.cursor = pick.cursor.saturating_sub(1);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::input::{handle_key, press, press_char};
    use tempfile::TempDir;

    #[test]
    fn reply_modal_creates_threaded_comment() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "a".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let c1 = app
            .mutate(Mutation::CreateComment {
                item_id: item.clone(),
                body: "first".into(),
                reply_to: None,
            })
            .unwrap()
            .created_id
            .unwrap();

        app.open_item(item, false);
        app.item_focus = crate::tui::app::ItemFocus::Comments;
        handle_key(&mut app, press_char('R'));
        assert!(matches!(app.modal, Some(Modal::ReplyComment { .. })));

        for c in "ok".chars() {
            handle_key(&mut app, press_char(c));
        }
        handle_key(&mut app, crate::tui::input::ctrl('s'));
        assert!(app.modal.is_none());
        let reply = app
            .ws
            .snapshot
            .comments
            .values()
            .find(|c| c.reply_to_comment_id.is_some())
            .unwrap();
        assert_eq!(reply.body, "ok");
        assert_eq!(reply.reply_to_comment_id.as_ref(), Some(&c1));
    }

    #[test]
    fn confirm_archive_open_item_returns_to_outline() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "a".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.open_item(item.clone(), false);
        handle_key(&mut app, press_char('R'));
        assert!(matches!(app.modal, Some(Modal::ConfirmArchive { .. })));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.ws.snapshot.item(&item).unwrap().archived);
        assert_eq!(app.view, View::Outline);
        assert!(app.minibuffer.as_deref().unwrap().contains("archived 1"));
    }

    #[test]
    fn esc_cancels_without_committing() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "before".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.open_item(item.clone(), false);
        handle_key(&mut app, press_char('e'));
        assert!(matches!(app.modal, Some(Modal::EditTitle { .. })));
        handle_key(&mut app, press_char('!'));
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert_eq!(app.ws.snapshot.item(&item).unwrap().title, "before");
    }
}

use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::projection::OutlineRow;
use crate::tui::actions;
use crate::tui::app::{App, EditState, Modal, Pane, TitleTarget, View};

use super::{filter, shortcut_action};

/// Keys in the outline view.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if app.outline_cursor + 1 < app.rows.len() {
                app.outline_cursor += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.outline_cursor = app.outline_cursor.saturating_sub(1);
        }
        KeyCode::Enter => match app.rows.get(app.outline_cursor) {
            Some(OutlineRow::Item(row)) => {
                let id = row.item_id.clone();
                app.open_item(id, false);
            }
            Some(OutlineRow::AddRow) => {
                if let Some(outline_id) = app.current_outline_id.clone() {
                    app.modal = Some(Modal::EditTitle {
                        target: TitleTarget::NewItem {
                            outline_id,
                            parent_id: None,
                        },
                        edit: EditState::default(),
                    });
                }
            }
            None => {}
        },
        KeyCode::Right => {
            if let Some(OutlineRow::Item(row)) = app.rows.get(app.outline_cursor) {
                if row.collapsed {
                    let id = row.item_id.clone();
                    app.set_collapsed(&id, false);
                }
            }
        }
        KeyCode::Left => {
            if let Some(OutlineRow::Item(row)) = app.rows.get(app.outline_cursor) {
                if row.has_children && !row.collapsed {
                    let id = row.item_id.clone();
                    app.set_collapsed(&id, true);
                } else if row.depth > 0 {
                    // Jump to the nearest ancestor row
                    let depth = row.depth;
                    if let Some(pos) = app.rows[..app.outline_cursor]
                        .iter()
                        .rposition(|r| matches!(r, OutlineRow::Item(p) if p.depth < depth))
                    {
                        app.outline_cursor = pos;
                    }
                }
            }
        }
        KeyCode::Tab => {
            app.pane = match app.pane {
                Pane::OutlinePane => Pane::DetailPane,
                Pane::DetailPane => Pane::OutlinePane,
            };
        }
        KeyCode::Char('/') => filter::start(app),
        KeyCode::Esc => {
            if app.filter.applied.is_some() {
                app.filter.clear();
                app.refresh();
            } else {
                app.view = View::OutlineList;
            }
        }
        KeyCode::Char(c) if super::plain(&key) => {
            if let Some(action) = shortcut_action(c) {
                actions::dispatch(app, action);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::pipeline::{Mutation, Position};
    use crate::tui::app::tests::{seed_outline, test_app};
    use crate::tui::input::{handle_key, press, press_char};
    use tempfile::TempDir;

    fn seed_tree(app: &mut App) -> (String, String) {
        let outline = seed_outline(app);
        let parent = app
            .mutate(Mutation::CreateItem {
                outline_id: outline.clone(),
                parent_id: None,
                title: "parent".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.mutate(Mutation::CreateItem {
            outline_id: outline,
            parent_id: Some(parent.clone()),
            title: "child".into(),
            description: String::new(),
            position: Position::End,
        })
        .unwrap();
        (parent, app.current_outline_id.clone().unwrap())
    }

    #[test]
    fn left_collapses_and_right_expands() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let (parent, _) = seed_tree(&mut app);
        assert_eq!(app.rows.len(), 3); // parent, child, add row

        handle_key(&mut app, press(KeyCode::Left));
        assert_eq!(app.rows.len(), 2);
        match &app.rows[0] {
            OutlineRow::Item(row) => {
                assert_eq!(row.item_id, parent);
                assert!(row.collapsed);
                assert_eq!(row.total_children, 1);
            }
            OutlineRow::AddRow => panic!("expected item row"),
        }

        handle_key(&mut app, press(KeyCode::Right));
        assert_eq!(app.rows.len(), 3);
    }

    #[test]
    fn left_on_child_jumps_to_parent() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        seed_tree(&mut app);
        app.outline_cursor = 1; // the child
        handle_key(&mut app, press(KeyCode::Left));
        assert_eq!(app.outline_cursor, 0);
    }

    #[test]
    fn enter_on_add_row_opens_new_item_modal() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        seed_tree(&mut app);
        app.outline_cursor = app.rows.len() - 1;
        assert!(matches!(app.rows.last(), Some(OutlineRow::AddRow)));
        handle_key(&mut app, press(KeyCode::Enter));
        match &app.modal {
            Some(Modal::EditTitle {
                target: TitleTarget::NewItem { parent_id, .. },
                ..
            }) => assert!(parent_id.is_none()),
            other => panic!("unexpected modal: {other:?}"),
        }
        for c in "third".chars() {
            handle_key(&mut app, press_char(c));
        }
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.modal.is_none());
        assert_eq!(app.rows.len(), 4);
    }

    #[test]
    fn esc_clears_applied_filter_before_leaving() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        seed_tree(&mut app);
        app.filter.applied = Some("child".into());
        app.refresh();
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.filter.applied.is_none());
        assert_eq!(app.view, View::Outline);
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.view, View::OutlineList);
    }
}

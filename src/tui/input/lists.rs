use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::pipeline::Mutation;
use crate::tui::actions;
use crate::tui::app::{App, EditState, Modal, TitleTarget, View};

use super::{filter, shortcut_action};

/// Keys in the project, outline, archived, and agenda list views.
pub fn handle(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => move_cursor(app, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(app, -1),
        KeyCode::Enter => activate(app),
        KeyCode::Char('N') if matches!(app.view, View::ProjectList | View::OutlineList) => {
            let target = match app.view {
                View::ProjectList => Some(TitleTarget::NewProject),
                View::OutlineList => app
                    .current_project_id
                    .clone()
                    .map(|project_id| TitleTarget::NewOutline { project_id }),
                _ => None,
            };
            if let Some(target) = target {
                app.modal = Some(Modal::EditTitle {
                    target,
                    edit: EditState::default(),
                });
            }
        }
        KeyCode::Char('U') if app.view == View::Archived => {
            if let Some(id) = app.target_item_id() {
                if let Some(applied) = app.mutate(Mutation::UnarchiveSubtree { id }) {
                    app.notify(format!("unarchived {} item(s)", applied.affected));
                }
            }
        }
        KeyCode::Char('/') => filter::start(app),
        KeyCode::Esc => {
            if app.filter.applied.is_some() {
                app.filter.clear();
                app.refresh();
            } else {
                go_back(app);
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

fn move_cursor(app: &mut App, delta: isize) {
    let (cursor, count) = match app.view {
        View::ProjectList => {
            let n = app.visible_projects().len();
            (&mut app.project_cursor, n)
        }
        View::OutlineList => {
            let n = app.visible_outlines().len();
            (&mut app.outline_list_cursor, n)
        }
        View::Archived => {
            let n = app.archived_items().len();
            (&mut app.archived_cursor, n)
        }
        View::Agenda => {
            let n = app.agenda_items().len();
            (&mut app.agenda_cursor, n)
        }
        _ => return,
    };
    if delta > 0 {
        if *cursor + 1 < count {
            *cursor += 1;
        }
    } else {
        *cursor = cursor.saturating_sub(1);
    }
}

fn activate(app: &mut App) {
    match app.view {
        View::ProjectList => {
            if let Some(project) = app.visible_projects().get(app.project_cursor) {
                let id = project.id.clone();
                app.open_project(id);
                app.view = View::OutlineList;
                app.refresh();
            }
        }
        View::OutlineList => {
            if let Some(outline) = app.visible_outlines().get(app.outline_list_cursor) {
                let id = outline.id.clone();
                app.open_outline(id);
            }
        }
        View::Archived => {
            if let Some(id) = app.target_item_id() {
                app.open_item(id, true);
            }
        }
        View::Agenda => {
            if let Some(id) = app.target_item_id() {
                app.open_item(id, false);
            }
        }
        _ => {}
    }
}

fn go_back(app: &mut App) {
    app.view = match app.view {
        View::OutlineList => View::ProjectList,
        View::Archived | View::Agenda => {
            if app.current_outline_id.is_some() {
                View::Outline
            } else {
                View::ProjectList
            }
        }
        other => other,
    };
}

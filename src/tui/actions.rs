//! Named actions, the per-context action maps the panels surface, and
//! the dispatcher that executes them against the app.

use crate::model::NO_STATUS;
use crate::ops::pipeline::Mutation;

use super::app::{App, EditState, ItemFocus, Modal, PanelKind, PickState, TitleTarget, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditTitle,
    EditDescription,
    AddComment,
    /// Reply when the comments region is focused, archive otherwise
    ReplyOrArchive,
    TogglePriority,
    ToggleOnHold,
    PickStatus,
    Assign,
    Duplicate,
    Copy,
    Links,
    TogglePreview,
    OpenNav,
    OpenAgenda,
    OpenCapture,
    OpenContext,
    Quit,
    GoProjects,
    GoOutlines,
    GoArchived,
    GoAgendaView,
    GoCaptureView,
}

/// Does this action change workspace state? Read-only views exclude
/// these from their action maps and suppress direct presses.
pub fn is_mutating(action: Action) -> bool {
    matches!(
        action,
        Action::EditTitle
            | Action::EditDescription
            | Action::AddComment
            | Action::ReplyOrArchive
            | Action::TogglePriority
            | Action::ToggleOnHold
            | Action::PickStatus
            | Action::Assign
            | Action::Duplicate
    )
}

/// The contextual action map for the current view. Lowercase entries
/// are openers/navigation, uppercase entries are mutating shortcuts;
/// the panel surfaces both.
pub fn context_actions(app: &App) -> Vec<(char, Action, &'static str)> {
    let mut actions: Vec<(char, Action, &'static str)> = Vec::new();
    let has_item = app.target_item_id().is_some();
    if has_item && !app.read_only {
        let reply_label = if app.view == View::Item && app.item_focus == ItemFocus::Comments {
            "reply to comment"
        } else {
            "archive"
        };
        actions.extend([
            ('e', Action::EditTitle, "edit title"),
            ('D', Action::EditDescription, "edit description"),
            ('C', Action::AddComment, "add comment"),
            ('R', Action::ReplyOrArchive, reply_label),
            ('p', Action::TogglePriority, "toggle priority"),
            ('h', Action::ToggleOnHold, "toggle on-hold"),
            ('s', Action::PickStatus, "pick status"),
            ('A', Action::Assign, "assign"),
            ('V', Action::Duplicate, "duplicate"),
        ]);
    }
    if has_item {
        actions.push(('y', Action::Copy, "copy title"));
        actions.push(('l', Action::Links, "links & attachments"));
    }
    actions.push(('o', Action::TogglePreview, "toggle preview"));
    actions.extend(global_actions());
    actions
}

/// Navigation panel entries
pub fn nav_actions() -> Vec<(char, Action, &'static str)> {
    vec![
        ('p', Action::GoProjects, "projects"),
        ('o', Action::GoOutlines, "outlines"),
        ('v', Action::GoArchived, "archived"),
    ]
}

pub fn agenda_actions() -> Vec<(char, Action, &'static str)> {
    vec![('a', Action::GoAgendaView, "open agenda")]
}

pub fn capture_actions() -> Vec<(char, Action, &'static str)> {
    vec![('c', Action::GoCaptureView, "open capture")]
}

/// The global openers, present in every panel
fn global_actions() -> Vec<(char, Action, &'static str)> {
    vec![
        ('g', Action::OpenNav, "nav"),
        ('a', Action::OpenAgenda, "agenda"),
        ('c', Action::OpenCapture, "capture"),
        ('x', Action::OpenContext, "context menu"),
        ('q', Action::Quit, "quit"),
    ]
}

/// Action map for one panel layer
pub fn panel_actions(app: &App, kind: PanelKind) -> Vec<(char, Action, &'static str)> {
    match kind {
        PanelKind::Context => context_actions(app),
        PanelKind::Nav => {
            let mut actions = nav_actions();
            actions.extend(global_actions());
            actions
        }
        PanelKind::Agenda => {
            let mut actions = agenda_actions();
            actions.extend(global_actions());
            actions
        }
        PanelKind::Capture => {
            let mut actions = capture_actions();
            actions.extend(global_actions());
            actions
        }
    }
}

/// Execute an action. Mutating actions are suppressed with a minibuffer
/// notice in read-only state.
pub fn dispatch(app: &mut App, action: Action) {
    if is_mutating(action) && app.read_only {
        app.notify("read-only");
        return;
    }
    match action {
        Action::EditTitle => {
            if let Some(id) = app.target_item_id() {
                let title = app
                    .ws
                    .snapshot
                    .item(&id)
                    .map(|i| i.title.clone())
                    .unwrap_or_default();
                app.modal = Some(Modal::EditTitle {
                    target: TitleTarget::Item(id),
                    edit: EditState::with_text(title),
                });
            } else {
                app.notify("no item selected");
            }
        }
        Action::EditDescription => {
            if let Some(id) = app.target_item_id() {
                let description = app
                    .ws
                    .snapshot
                    .item(&id)
                    .map(|i| i.description.clone())
                    .unwrap_or_default();
                app.modal = Some(Modal::EditDescription {
                    item_id: id,
                    edit: EditState::with_text(description),
                });
            } else {
                app.notify("no item selected");
            }
        }
        Action::AddComment => {
            if let Some(id) = app.target_item_id() {
                app.modal = Some(Modal::AddComment {
                    item_id: id,
                    edit: EditState::default(),
                });
            } else {
                app.notify("no item selected");
            }
        }
        Action::ReplyOrArchive => {
            if app.view == View::Item && app.item_focus == ItemFocus::Comments {
                match (app.open_item_id.clone(), app.selected_comment()) {
                    (Some(item_id), Some(parent_id)) => {
                        app.modal = Some(Modal::ReplyComment {
                            item_id,
                            parent_id,
                            edit: EditState::default(),
                        });
                    }
                    _ => app.notify("no comment selected"),
                }
            } else if let Some(id) = app.target_item_id() {
                app.modal = Some(Modal::ConfirmArchive { item_id: id });
            } else {
                app.notify("no item selected");
            }
        }
        Action::TogglePriority => {
            if let Some(id) = app.target_item_id() {
                app.mutate(Mutation::TogglePriority { id });
            }
        }
        Action::ToggleOnHold => {
            if let Some(id) = app.target_item_id() {
                app.mutate(Mutation::ToggleOnHold { id });
            }
        }
        Action::PickStatus => {
            if let Some(id) = app.target_item_id() {
                let Some(outline) = app
                    .ws
                    .snapshot
                    .item(&id)
                    .and_then(|i| app.ws.snapshot.outline(&i.outline_id))
                else {
                    return;
                };
                let mut options: Vec<(String, String)> = outline
                    .status_defs
                    .iter()
                    .map(|d| (d.id.clone(), d.label.clone()))
                    .collect();
                options.push((NO_STATUS.to_string(), "(no status)".to_string()));
                app.modal = Some(Modal::PickStatus {
                    item_id: id,
                    pick: PickState { options, cursor: 0 },
                });
            }
        }
        Action::Assign => {
            if let Some(id) = app.target_item_id() {
                let options: Vec<(String, String)> = app
                    .ws
                    .snapshot
                    .actors
                    .values()
                    .map(|a| (a.id.clone(), a.name.clone()))
                    .collect();
                app.modal = Some(Modal::PickAssignee {
                    item_id: id,
                    pick: PickState { options, cursor: 0 },
                });
            }
        }
        Action::Duplicate => {
            if let Some(id) = app.target_item_id() {
                if app.mutate(Mutation::DuplicateItem { id }).is_some() {
                    app.notify("duplicated");
                }
            }
        }
        Action::Copy => {
            if let Some(id) = app.target_item_id() {
                let title = app
                    .ws
                    .snapshot
                    .item(&id)
                    .map(|i| i.title.clone())
                    .unwrap_or_default();
                app.copy_buffer = Some(title);
                app.notify("copied");
            }
        }
        Action::Links => {
            if let Some(id) = app.target_item_id() {
                let options: Vec<(String, String)> = app
                    .ws
                    .snapshot
                    .attachments_for(crate::model::AttachmentEntity::Item, &id)
                    .iter()
                    .map(|a| {
                        (
                            a.id.clone(),
                            format!("{} ({} bytes)", a.original_name, a.size_bytes),
                        )
                    })
                    .collect();
                if options.is_empty() {
                    app.notify("no attachments");
                } else {
                    app.modal = Some(Modal::PickTargets {
                        item_id: id,
                        pick: PickState { options, cursor: 0 },
                    });
                }
            }
        }
        Action::TogglePreview => {
            app.show_preview = !app.show_preview;
        }
        Action::OpenNav => app.open_panel(PanelKind::Nav),
        Action::OpenAgenda => app.open_panel(PanelKind::Agenda),
        Action::OpenCapture => app.open_panel(PanelKind::Capture),
        Action::OpenContext => app.open_panel(PanelKind::Context),
        Action::Quit => app.request_quit(),
        Action::GoProjects => {
            app.filter.clear();
            app.view = View::ProjectList;
            app.refresh();
        }
        Action::GoOutlines => {
            app.filter.clear();
            if app.current_project_id.is_some() {
                app.view = View::OutlineList;
            } else {
                app.view = View::ProjectList;
            }
            app.refresh();
        }
        Action::GoArchived => {
            app.filter.clear();
            app.view = View::Archived;
            app.refresh();
        }
        Action::GoAgendaView => {
            app.filter.clear();
            app.view = View::Agenda;
            app.refresh();
        }
        Action::GoCaptureView => {
            app.view = View::Capture;
        }
    }
}

use std::collections::{HashMap, HashSet};

use crate::model::{Comment, Item, Project, Snapshot};
use crate::ops::pipeline::{Applied, Mutation, MutationError, Workspace};
use crate::ops::projection::{OutlineRow, outline_rows};
use crate::store::config::WorkspaceConfig;

/// Which top-level view is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    ProjectList,
    OutlineList,
    Outline,
    Item,
    Archived,
    Agenda,
    Capture,
}

/// Pane focus inside the outline and item views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    OutlinePane,
    DetailPane,
}

/// The item view's focus ring, cycled by Tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFocus {
    Title,
    Status,
    Priority,
    Description,
    Children,
    Comments,
}

impl ItemFocus {
    pub fn next(self) -> ItemFocus {
        match self {
            ItemFocus::Title => ItemFocus::Status,
            ItemFocus::Status => ItemFocus::Priority,
            ItemFocus::Priority => ItemFocus::Description,
            ItemFocus::Description => ItemFocus::Children,
            ItemFocus::Children => ItemFocus::Comments,
            ItemFocus::Comments => ItemFocus::Title,
        }
    }

    pub fn prev(self) -> ItemFocus {
        match self {
            ItemFocus::Title => ItemFocus::Comments,
            ItemFocus::Status => ItemFocus::Title,
            ItemFocus::Priority => ItemFocus::Status,
            ItemFocus::Description => ItemFocus::Priority,
            ItemFocus::Children => ItemFocus::Description,
            ItemFocus::Comments => ItemFocus::Children,
        }
    }
}

/// One stackable action-panel layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Context,
    Nav,
    Agenda,
    Capture,
}

/// Single-line text editing state for modals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    pub buffer: String,
    /// Byte offset, always on a grapheme boundary
    pub cursor: usize,
}

impl EditState {
    pub fn with_text(text: impl Into<String>) -> EditState {
        let buffer = text.into();
        let cursor = buffer.len();
        EditState { buffer, cursor }
    }
}

/// List-picker state for assignee/status/target modals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickState {
    /// (id, label) pairs
    pub options: Vec<(String, String)>,
    pub cursor: usize,
}

/// What an edit-title modal writes to on confirm
#[derive(Debug, Clone, PartialEq)]
pub enum TitleTarget {
    Item(String),
    NewItem {
        outline_id: String,
        parent_id: Option<String>,
    },
    NewProject,
    NewOutline {
        project_id: String,
    },
}

/// The single active modal, if any
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    EditTitle {
        target: TitleTarget,
        edit: EditState,
    },
    EditDescription {
        item_id: String,
        edit: EditState,
    },
    AddComment {
        item_id: String,
        edit: EditState,
    },
    ReplyComment {
        item_id: String,
        parent_id: String,
        edit: EditState,
    },
    /// Read-only view of a comment or description
    ViewEntry {
        title: String,
        body: String,
    },
    PickAssignee {
        item_id: String,
        pick: PickState,
    },
    PickStatus {
        item_id: String,
        pick: PickState,
    },
    /// Links/attachments picker
    PickTargets {
        item_id: String,
        pick: PickState,
    },
    ConfirmArchive {
        item_id: String,
    },
    ConfirmExit,
    ActionPanel {
        stack: Vec<PanelKind>,
    },
}

/// List filter state: `/` enters, Enter applies, Esc clears
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub entering: bool,
    pub input: String,
    pub applied: Option<String>,
}

impl FilterState {
    /// The filter text projections should use right now
    pub fn active(&self) -> &str {
        if self.entering {
            &self.input
        } else {
            self.applied.as_deref().unwrap_or("")
        }
    }

    pub fn clear(&mut self) {
        self.entering = false;
        self.input.clear();
        self.applied = None;
    }
}

/// Quick-capture draft, submitted with Ctrl+S
#[derive(Debug, Clone, Default)]
pub struct CaptureDraft {
    pub title: String,
    pub description: String,
    /// Which field the cursor is in
    pub in_description: bool,
}

impl CaptureDraft {
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}

/// Main application state. Rendering reads it; input mutates it; every
/// data change goes through `mutate` and the pipeline.
pub struct App {
    pub ws: Workspace,
    pub config: WorkspaceConfig,
    pub view: View,
    pub pane: Pane,
    pub item_focus: ItemFocus,
    pub modal: Option<Modal>,
    pub filter: FilterState,
    /// Transient one-line notice, cleared on the next key
    pub minibuffer: Option<String>,
    pub should_quit: bool,
    pub show_preview: bool,
    /// Set when the open item came from the archived view
    pub read_only: bool,
    pub copy_buffer: Option<String>,

    pub current_project_id: Option<String>,
    pub current_outline_id: Option<String>,
    pub open_item_id: Option<String>,
    /// Previously-open items, most recent last
    pub nav_stack: Vec<String>,
    /// Where Esc from the item view returns when the nav stack is empty
    pub return_view: Option<View>,

    /// Collapsed item ids per outline
    pub collapsed: HashMap<String, HashSet<String>>,
    /// Outline view rows, rebuilt by `refresh`
    pub rows: Vec<OutlineRow>,
    /// Narrowed rows for the item view's children region
    pub item_rows: Vec<OutlineRow>,

    pub project_cursor: usize,
    pub outline_list_cursor: usize,
    pub outline_cursor: usize,
    pub archived_cursor: usize,
    pub agenda_cursor: usize,
    pub child_cursor: usize,
    pub comment_cursor: usize,

    pub capture: CaptureDraft,
}

impl App {
    pub fn new(ws: Workspace, config: WorkspaceConfig) -> App {
        let default_project = config
            .default_project
            .as_ref()
            .filter(|id| ws.snapshot.project(id).is_some())
            .cloned();
        let default_outline =
            default_project
                .as_ref()
                .and_then(|p| first_outline_of(&ws.snapshot, p));
        let view = if default_outline.is_some() {
            View::Outline
        } else {
            View::ProjectList
        };

        let mut app = App {
            ws,
            config,
            view,
            pane: Pane::OutlinePane,
            item_focus: ItemFocus::Title,
            modal: None,
            filter: FilterState::default(),
            minibuffer: None,
            should_quit: false,
            show_preview: false,
            read_only: false,
            copy_buffer: None,
            current_project_id: default_project,
            current_outline_id: default_outline,
            open_item_id: None,
            nav_stack: Vec::new(),
            return_view: None,
            collapsed: HashMap::new(),
            rows: Vec::new(),
            item_rows: Vec::new(),
            project_cursor: 0,
            outline_list_cursor: 0,
            outline_cursor: 0,
            archived_cursor: 0,
            agenda_cursor: 0,
            child_cursor: 0,
            comment_cursor: 0,
            capture: CaptureDraft::default(),
        };
        app.refresh();
        app
    }

    // -- projections -----------------------------------------------------

    /// Rebuild row projections from the snapshot. Call after every
    /// mutation, expansion change, filter change, or navigation.
    pub fn refresh(&mut self) {
        self.rows = match &self.current_outline_id {
            Some(outline_id) => {
                let empty = HashSet::new();
                let collapsed = self.collapsed.get(outline_id).unwrap_or(&empty);
                outline_rows(
                    &self.ws.snapshot,
                    outline_id,
                    collapsed,
                    None,
                    self.filter.active(),
                    true,
                )
            }
            None => Vec::new(),
        };
        self.item_rows = match (&self.open_item_id, &self.current_outline_id) {
            (Some(item_id), Some(outline_id)) => {
                let empty = HashSet::new();
                let collapsed = self.collapsed.get(outline_id).unwrap_or(&empty);
                outline_rows(
                    &self.ws.snapshot,
                    outline_id,
                    collapsed,
                    Some(item_id),
                    "",
                    false,
                )
            }
            _ => Vec::new(),
        };
        self.clamp_cursors();
    }

    fn clamp_cursors(&mut self) {
        let clamp = |cursor: &mut usize, len: usize| {
            *cursor = (*cursor).min(len.saturating_sub(1));
        };
        let projects = self.visible_projects().len();
        let outlines = self.visible_outlines().len();
        let archived = self.archived_items().len();
        let agenda = self.agenda_items().len();
        clamp(&mut self.outline_cursor, self.rows.len());
        clamp(&mut self.project_cursor, projects);
        clamp(&mut self.outline_list_cursor, outlines);
        clamp(&mut self.archived_cursor, archived);
        clamp(&mut self.agenda_cursor, agenda);
        // Skip the root row of the narrowed projection
        clamp(
            &mut self.child_cursor,
            self.item_rows.len().saturating_sub(1),
        );
        let comments = self
            .open_item_id
            .as_ref()
            .map_or(0, |id| self.comment_thread(id).len());
        clamp(&mut self.comment_cursor, comments);
    }

    /// Non-archived projects matching the active filter
    pub fn visible_projects(&self) -> Vec<&Project> {
        let filter = self.filter.active().to_lowercase();
        self.ws
            .snapshot
            .projects
            .values()
            .filter(|p| !p.archived)
            .filter(|p| filter.is_empty() || p.name.to_lowercase().contains(&filter))
            .collect()
    }

    /// Non-archived outlines of the current project matching the filter
    pub fn visible_outlines(&self) -> Vec<&crate::model::Outline> {
        let Some(project_id) = &self.current_project_id else {
            return Vec::new();
        };
        let filter = self.filter.active().to_lowercase();
        self.ws
            .snapshot
            .outlines_of(project_id)
            .into_iter()
            .filter(|o| !o.archived)
            .filter(|o| filter.is_empty() || o.description.to_lowercase().contains(&filter))
            .collect()
    }

    /// Archived items, most recently archived first
    pub fn archived_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .ws
            .snapshot
            .items
            .values()
            .filter(|i| i.archived)
            .filter(|i| i.matches(self.filter.active()))
            .collect();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items
    }

    /// Agenda: open items carrying priority or assigned to the current
    /// actor, freshest first
    pub fn agenda_items(&self) -> Vec<&Item> {
        let me = &self.ws.current_actor_id;
        let mut items: Vec<&Item> = self
            .ws
            .snapshot
            .items
            .values()
            .filter(|i| !i.archived && !i.on_hold)
            .filter(|i| i.priority || i.assignee_actor_ids.contains(me))
            .filter(|i| i.matches(self.filter.active()))
            .collect();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items
    }

    /// Threaded comment order for an item: roots in creation order,
    /// replies nested depth-first
    pub fn comment_thread(&self, item_id: &str) -> Vec<(String, usize)> {
        let comments = self.ws.snapshot.comments_for(item_id);
        let mut out = Vec::new();
        fn descend(comments: &[&Comment], parent: Option<&str>, depth: usize, out: &mut Vec<(String, usize)>) {
            for c in comments
                .iter()
                .filter(|c| c.reply_to_comment_id.as_deref() == parent)
            {
                out.push((c.id.clone(), depth));
                descend(comments, Some(&c.id), depth + 1, out);
            }
        }
        descend(&comments, None, 0, &mut out);
        out
    }

    // -- selection -------------------------------------------------------

    /// Item under the outline-view cursor
    pub fn selected_outline_item(&self) -> Option<&str> {
        self.rows.get(self.outline_cursor).and_then(|r| r.item_id())
    }

    /// Child selected in the item view (row 0 is the open item itself)
    pub fn selected_child(&self) -> Option<&str> {
        self.item_rows
            .get(self.child_cursor + 1)
            .and_then(|r| r.item_id())
    }

    /// Comment selected in the item view
    pub fn selected_comment(&self) -> Option<String> {
        let item_id = self.open_item_id.as_ref()?;
        self.comment_thread(item_id)
            .get(self.comment_cursor)
            .map(|(id, _)| id.clone())
    }

    /// Item a contextual action applies to in the current view
    pub fn target_item_id(&self) -> Option<String> {
        match self.view {
            View::Item => self.open_item_id.clone(),
            View::Outline => self.selected_outline_item().map(String::from),
            View::Archived => self
                .archived_items()
                .get(self.archived_cursor)
                .map(|i| i.id.clone()),
            View::Agenda => self
                .agenda_items()
                .get(self.agenda_cursor)
                .map(|i| i.id.clone()),
            _ => None,
        }
    }

    // -- navigation ------------------------------------------------------

    pub fn open_project(&mut self, project_id: String) {
        self.current_project_id = Some(project_id);
        self.current_outline_id = None;
        self.filter.clear();
        self.outline_list_cursor = 0;
        self.view = View::OutlineList;
        self.refresh();
    }

    pub fn open_outline(&mut self, outline_id: String) {
        if let Some(outline) = self.ws.snapshot.outline(&outline_id) {
            self.current_project_id = Some(outline.project_id.clone());
        }
        self.current_outline_id = Some(outline_id);
        self.filter.clear();
        self.outline_cursor = 0;
        self.pane = Pane::OutlinePane;
        self.view = View::Outline;
        self.refresh();
    }

    /// Open an item's view. Pushes the previously-open item on the nav
    /// stack; remembers the originating view for Esc.
    pub fn open_item(&mut self, item_id: String, read_only: bool) {
        if self.view == View::Item {
            if let Some(prev) = self.open_item_id.take() {
                self.nav_stack.push(prev);
            }
        } else {
            self.return_view = Some(self.view);
            self.nav_stack.clear();
            self.read_only = read_only;
        }
        if let Some(item) = self.ws.snapshot.item(&item_id) {
            self.current_outline_id = Some(item.outline_id.clone());
            self.current_project_id = Some(item.project_id.clone());
        }
        self.open_item_id = Some(item_id);
        self.view = View::Item;
        self.item_focus = ItemFocus::Title;
        self.pane = Pane::OutlinePane;
        self.child_cursor = 0;
        self.comment_cursor = 0;
        self.refresh();
    }

    /// Esc from the item view: pop the nav stack, else return to the
    /// originating view.
    pub fn close_item(&mut self) {
        if let Some(prev) = self.nav_stack.pop() {
            self.open_item_id = Some(prev);
            self.item_focus = ItemFocus::Title;
            self.child_cursor = 0;
            self.comment_cursor = 0;
            self.refresh();
            return;
        }
        self.open_item_id = None;
        self.read_only = false;
        self.view = self.return_view.take().unwrap_or(View::Outline);
        self.refresh();
    }

    /// Leave the item view because the open item was archived
    pub fn leave_archived_item(&mut self) {
        self.nav_stack.clear();
        self.open_item_id = None;
        self.read_only = false;
        self.return_view = None;
        self.view = View::Outline;
        self.refresh();
    }

    // -- mutations -------------------------------------------------------

    /// Route a mutation through the pipeline, surfacing errors in the
    /// minibuffer. Read-only views suppress everything.
    pub fn mutate(&mut self, mutation: Mutation) -> Option<Applied> {
        if self.read_only {
            self.notify(MutationError::ReadOnly.to_string());
            return None;
        }
        match self.ws.apply(mutation) {
            Ok(applied) => {
                self.refresh();
                Some(applied)
            }
            Err(err) => {
                self.notify(err.to_string());
                self.refresh();
                None
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.minibuffer = Some(message.into());
    }

    // -- expansion -------------------------------------------------------

    pub fn toggle_collapsed(&mut self, item_id: &str) {
        let Some(outline_id) = self.current_outline_id.clone() else {
            return;
        };
        let set = self.collapsed.entry(outline_id).or_default();
        if !set.remove(item_id) {
            set.insert(item_id.to_string());
        }
        self.refresh();
    }

    pub fn set_collapsed(&mut self, item_id: &str, collapsed: bool) {
        let Some(outline_id) = self.current_outline_id.clone() else {
            return;
        };
        let set = self.collapsed.entry(outline_id).or_default();
        if collapsed {
            set.insert(item_id.to_string());
        } else {
            set.remove(item_id);
        }
        self.refresh();
    }

    // -- action panel ----------------------------------------------------

    /// Open a panel, pushing onto an existing stack. Idempotent: a kind
    /// already in the stack is not pushed again.
    pub fn open_panel(&mut self, kind: PanelKind) {
        match &mut self.modal {
            Some(Modal::ActionPanel { stack }) => {
                if !stack.contains(&kind) {
                    stack.push(kind);
                }
            }
            Some(_) => {}
            None => {
                self.modal = Some(Modal::ActionPanel { stack: vec![kind] });
            }
        }
    }

    /// Pop one panel layer; closing the last closes the modal.
    pub fn pop_panel(&mut self) {
        if let Some(Modal::ActionPanel { stack }) = &mut self.modal {
            stack.pop();
            if stack.is_empty() {
                self.modal = None;
            }
        }
    }

    pub fn panel_stack(&self) -> Option<&[PanelKind]> {
        match &self.modal {
            Some(Modal::ActionPanel { stack }) => Some(stack),
            _ => None,
        }
    }

    // -- quitting --------------------------------------------------------

    /// Explicit quit action; an unsubmitted capture draft asks first.
    pub fn request_quit(&mut self) {
        if self.view == View::Capture && !self.capture.is_empty() {
            self.modal = Some(Modal::ConfirmExit);
        } else {
            self.should_quit = true;
        }
    }

    /// Outline the capture draft lands in: the default project's first
    /// outline, else the first outline in the workspace.
    pub fn capture_outline(&self) -> Option<String> {
        if let Some(project_id) = self
            .config
            .default_project
            .as_ref()
            .or(self.current_project_id.as_ref())
        {
            if let Some(outline) = first_outline_of(&self.ws.snapshot, project_id) {
                return Some(outline);
            }
        }
        self.ws
            .snapshot
            .outlines
            .values()
            .find(|o| !o.archived)
            .map(|o| o.id.clone())
    }
}

fn first_outline_of(snapshot: &Snapshot, project_id: &str) -> Option<String> {
    snapshot
        .outlines
        .values()
        .find(|o| o.project_id == project_id && !o.archived)
        .map(|o| o.id.clone())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Actor;
    use crate::ops::pipeline::{Position, SeqIdGen, SystemClock};
    use crate::store::Store;
    use chrono::Utc;
    use tempfile::TempDir;

    pub(crate) fn test_app(tmp: &TempDir) -> App {
        let store = Store::init(tmp.path(), Actor::human("h1", "Ada", Utc::now())).unwrap();
        let ws = Workspace::open_with(
            store,
            "h1".into(),
            Box::new(SystemClock),
            Box::new(SeqIdGen::new("id")),
        )
        .unwrap();
        App::new(ws, WorkspaceConfig::default())
    }

    pub(crate) fn seed_outline(app: &mut App) -> String {
        let project = app
            .mutate(Mutation::CreateProject { name: "Main".into() })
            .unwrap()
            .created_id
            .unwrap();
        let outline = app
            .mutate(Mutation::CreateOutline {
                project_id: project,
                description: "Backlog".into(),
            })
            .unwrap()
            .created_id
            .unwrap();
        app.open_outline(outline.clone());
        outline
    }

    #[test]
    fn initial_view_without_default_project_is_project_list() {
        let tmp = TempDir::new().unwrap();
        let app = test_app(&tmp);
        assert_eq!(app.view, View::ProjectList);
    }

    #[test]
    fn panel_stack_is_lifo_and_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        app.open_panel(PanelKind::Context);
        app.open_panel(PanelKind::Nav);
        app.open_panel(PanelKind::Context); // already present
        assert_eq!(
            app.panel_stack(),
            Some(&[PanelKind::Context, PanelKind::Nav][..])
        );
        app.pop_panel();
        assert_eq!(app.panel_stack(), Some(&[PanelKind::Context][..]));
        app.pop_panel();
        assert!(app.modal.is_none());
    }

    #[test]
    fn read_only_suppresses_mutations() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let item = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "keep".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        app.read_only = true;
        let before = app.ws.snapshot.item(&item).unwrap().clone();
        assert!(app.mutate(Mutation::TogglePriority { id: item.clone() }).is_none());
        assert_eq!(app.minibuffer.as_deref(), Some("read-only"));
        assert_eq!(app.ws.snapshot.item(&item).unwrap(), &before);
    }

    #[test]
    fn nav_stack_pops_back_through_items() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let a = app
            .mutate(Mutation::CreateItem {
                outline_id: outline.clone(),
                parent_id: None,
                title: "a".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let b = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: Some(a.clone()),
                title: "b".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();

        app.open_item(a.clone(), false);
        assert_eq!(app.return_view, Some(View::Outline));
        app.open_item(b, false);
        assert_eq!(app.nav_stack, vec![a.clone()]);
        app.close_item();
        assert_eq!(app.open_item_id, Some(a));
        assert_eq!(app.view, View::Item);
        app.close_item();
        assert_eq!(app.view, View::Outline);
        assert!(app.open_item_id.is_none());
    }

    #[test]
    fn narrowed_rows_survive_mutating_the_open_item() {
        let tmp = TempDir::new().unwrap();
        let mut app = test_app(&tmp);
        let outline = seed_outline(&mut app);
        let a = app
            .mutate(Mutation::CreateItem {
                outline_id: outline.clone(),
                parent_id: None,
                title: "a".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let _sibling = app
            .mutate(Mutation::CreateItem {
                outline_id: outline.clone(),
                parent_id: None,
                title: "sibling".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();
        let child = app
            .mutate(Mutation::CreateItem {
                outline_id: outline,
                parent_id: Some(a.clone()),
                title: "child".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap()
            .created_id
            .unwrap();

        app.open_item(a.clone(), false);
        app.mutate(Mutation::TogglePriority { id: a.clone() });
        let ids: Vec<&str> = app.item_rows.iter().filter_map(|r| r.item_id()).collect();
        assert_eq!(ids, vec![a.as_str(), child.as_str()]);
    }
}

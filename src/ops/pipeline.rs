//! The single write path: describe a change as a `Mutation`, apply it
//! through `Workspace::apply`, and every successful commit leaves an
//! updated snapshot on disk plus matching event records attributed to
//! the edit-actor.

use chrono::{DateTime, Utc};

use crate::model::{
    Attachment, AttachmentEntity, Comment, Event, EventKind, Item, NO_STATUS, Outline, Project,
    Snapshot, StatusDef, default_status_defs,
};
use crate::ops::rank::rank_between;
use crate::store::{Store, StoreError};

/// Time source seam; tests pin it
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Id source seam; tests use a deterministic counter
pub trait IdGen {
    fn new_id(&mut self) -> String;
}

/// Random v4 ids
pub struct UuidGen;

impl IdGen for UuidGen {
    fn new_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Fixed clock for tests
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Deterministic ids for tests: `prefix-1`, `prefix-2`, …
pub struct SeqIdGen {
    prefix: String,
    next: u64,
}

impl SeqIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        SeqIdGen {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGen for SeqIdGen {
    fn new_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Error type for mutations. `Conflict` is reserved for a future
/// multi-writer mode and never constructed here.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("read-only")]
    ReadOnly,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where to place an item inside a sibling set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    /// Append after the last sibling
    End,
    /// Insert before the first sibling
    Start,
    /// Insert after the sibling with this id
    After(String),
}

/// A described change; `Workspace::apply` is the only way to commit one
#[derive(Debug, Clone)]
pub enum Mutation {
    CreateProject {
        name: String,
    },
    EditProject {
        id: String,
        name: Option<String>,
        archived: Option<bool>,
    },
    CreateOutline {
        project_id: String,
        description: String,
    },
    EditOutline {
        id: String,
        description: Option<String>,
        archived: Option<bool>,
        status_defs: Option<Vec<StatusDef>>,
    },
    CreateItem {
        outline_id: String,
        parent_id: Option<String>,
        title: String,
        description: String,
        position: Position,
    },
    EditItem {
        id: String,
        title: Option<String>,
        description: Option<String>,
        tags: Option<Vec<String>>,
    },
    SetStatus {
        id: String,
        status_id: String,
    },
    TogglePriority {
        id: String,
    },
    ToggleOnHold {
        id: String,
    },
    Assign {
        id: String,
        actor_id: String,
    },
    Unassign {
        id: String,
        actor_id: String,
    },
    ArchiveSubtree {
        id: String,
    },
    UnarchiveSubtree {
        id: String,
    },
    MoveItem {
        id: String,
        new_parent_id: Option<String>,
        position: Position,
    },
    DuplicateItem {
        id: String,
    },
    CreateComment {
        item_id: String,
        body: String,
        reply_to: Option<String>,
    },
    EditComment {
        id: String,
        body: String,
    },
    CreateAttachment {
        entity_kind: AttachmentEntity,
        entity_id: String,
        original_name: String,
        size_bytes: u64,
        path: String,
    },
}

/// Result of a committed mutation
#[derive(Debug)]
pub struct Applied {
    /// Events appended, with store-assigned seq
    pub events: Vec<Event>,
    /// Number of entities whose state changed (subtree ops count items)
    pub affected: usize,
    /// Id of a freshly created entity, when the mutation creates one
    pub created_id: Option<String>,
}

/// The store, the loaded snapshot, and the acting identity, bound
/// together so that every committed change writes both.
pub struct Workspace {
    store: Store,
    pub snapshot: Snapshot,
    pub current_actor_id: String,
    clock: Box<dyn Clock>,
    idgen: Box<dyn IdGen>,
}

impl Workspace {
    /// Open a workspace with the wall clock and random ids.
    pub fn open(store: Store, current_actor_id: String) -> Result<Self, StoreError> {
        let snapshot = store.load()?;
        Ok(Workspace {
            store,
            snapshot,
            current_actor_id,
            clock: Box::new(SystemClock),
            idgen: Box::new(UuidGen),
        })
    }

    /// Open with pinned clock/id seams (tests).
    pub fn open_with(
        store: Store,
        current_actor_id: String,
        clock: Box<dyn Clock>,
        idgen: Box<dyn IdGen>,
    ) -> Result<Self, StoreError> {
        let snapshot = store.load()?;
        Ok(Workspace {
            store,
            snapshot,
            current_actor_id,
            clock,
            idgen,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Persist the snapshot outside the mutation path (seeding, tests).
    pub fn save_snapshot(&mut self) -> Result<(), StoreError> {
        self.snapshot.version += 1;
        self.store.save(&self.snapshot)
    }

    /// The actor mutations are attributed to: an agent's owning human,
    /// or the current human itself.
    pub fn edit_actor_id(&self) -> Result<String, MutationError> {
        let actor = self
            .snapshot
            .actor(&self.current_actor_id)
            .ok_or_else(|| MutationError::NotFound(format!("actor {}", self.current_actor_id)))?;
        if actor.is_agent() {
            actor.user_id.clone().ok_or_else(|| {
                MutationError::InvariantViolation(format!("agent {} has no owning user", actor.id))
            })
        } else {
            Ok(actor.id.clone())
        }
    }

    /// Apply one mutation: resolve the edit-actor, validate against the
    /// snapshot, commit (save + append events). On a save failure the
    /// snapshot is reloaded from disk and no event is appended.
    pub fn apply(&mut self, mutation: Mutation) -> Result<Applied, MutationError> {
        let actor = self.edit_actor_id()?;
        let now = self.clock.now();
        let prev = self.snapshot.clone();
        let staged = self.stage(mutation, &actor, now)?;
        self.commit(staged, prev)
    }

    // -- staging ---------------------------------------------------------

    /// Validate and apply a mutation to the in-memory snapshot, returning
    /// the events to append. Validation happens before any state change.
    fn stage(
        &mut self,
        mutation: Mutation,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Staged, MutationError> {
        match mutation {
            Mutation::CreateProject { name } => {
                if name.trim().is_empty() {
                    return Err(MutationError::InvalidArgument("project name is empty".into()));
                }
                let project = Project {
                    id: self.idgen.new_id(),
                    name,
                    archived: false,
                    created_by: actor.to_string(),
                    created_at: now,
                };
                let event = entity_event(EventKind::ProjectCreate, &project.id, actor, now, &project);
                let id = project.id.clone();
                self.snapshot.projects.insert(id.clone(), project);
                Ok(Staged::created(vec![event?], id))
            }

            Mutation::EditProject { id, name, archived } => {
                let project = self
                    .snapshot
                    .projects
                    .get_mut(&id)
                    .ok_or_else(|| MutationError::NotFound(format!("project {id}")))?;
                if let Some(name) = name {
                    project.name = name;
                }
                if let Some(archived) = archived {
                    project.archived = archived;
                }
                let event =
                    entity_event(EventKind::ProjectUpdate, &id, actor, now, &project.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::CreateOutline {
                project_id,
                description,
            } => {
                self.snapshot
                    .project(&project_id)
                    .ok_or_else(|| MutationError::NotFound(format!("project {project_id}")))?;
                let outline = Outline {
                    id: self.idgen.new_id(),
                    project_id,
                    description,
                    status_defs: default_status_defs(),
                    archived: false,
                    created_by: actor.to_string(),
                    created_at: now,
                };
                let event = entity_event(EventKind::OutlineCreate, &outline.id, actor, now, &outline)?;
                let id = outline.id.clone();
                self.snapshot.outlines.insert(id.clone(), outline);
                Ok(Staged::created(vec![event], id))
            }

            Mutation::EditOutline {
                id,
                description,
                archived,
                status_defs,
            } => {
                let outline = self
                    .snapshot
                    .outlines
                    .get_mut(&id)
                    .ok_or_else(|| MutationError::NotFound(format!("outline {id}")))?;
                if let Some(defs) = &status_defs {
                    if defs.is_empty() {
                        return Err(MutationError::InvalidArgument(
                            "an outline needs at least one status".into(),
                        ));
                    }
                }
                if let Some(description) = description {
                    outline.description = description;
                }
                if let Some(archived) = archived {
                    outline.archived = archived;
                }
                let defs_changed = status_defs.is_some();
                if let Some(defs) = status_defs {
                    outline.status_defs = defs;
                }
                let outline = outline.clone();
                let mut events =
                    vec![entity_event(EventKind::OutlineUpdate, &id, actor, now, &outline)?];
                if defs_changed {
                    // Items holding a dropped status fall back to no status,
                    // in the same staged change
                    let orphaned: Vec<String> = self
                        .snapshot
                        .items
                        .values()
                        .filter(|i| {
                            i.outline_id == id
                                && i.status_id != NO_STATUS
                                && outline.status_def(&i.status_id).is_none()
                        })
                        .map(|i| i.id.clone())
                        .collect();
                    for item_id in orphaned {
                        let item = self.require_item_mut(&item_id)?;
                        item.status_id = NO_STATUS.to_string();
                        item.updated_at = now;
                        events.push(entity_event(
                            EventKind::ItemUpdate,
                            &item_id,
                            actor,
                            now,
                            &item.clone(),
                        )?);
                    }
                }
                Ok(Staged::simple(events))
            }

            Mutation::CreateItem {
                outline_id,
                parent_id,
                title,
                description,
                position,
            } => {
                if title.trim().is_empty() {
                    return Err(MutationError::InvalidArgument("item title is empty".into()));
                }
                let outline = self
                    .snapshot
                    .outline(&outline_id)
                    .ok_or_else(|| MutationError::NotFound(format!("outline {outline_id}")))?;
                let project_id = outline.project_id.clone();
                let status_id = outline.initial_status().to_string();
                if let Some(parent) = &parent_id {
                    let parent_item = self
                        .snapshot
                        .item(parent)
                        .ok_or_else(|| MutationError::NotFound(format!("item {parent}")))?;
                    if parent_item.outline_id != outline_id {
                        return Err(MutationError::InvariantViolation(
                            "parent belongs to a different outline".into(),
                        ));
                    }
                }
                let rank = self.rank_for(&outline_id, parent_id.as_deref(), &position, None)?;
                let item = Item {
                    id: self.idgen.new_id(),
                    project_id,
                    outline_id,
                    parent_id,
                    rank,
                    title,
                    description,
                    status_id,
                    priority: false,
                    on_hold: false,
                    archived: false,
                    owner_actor_id: actor.to_string(),
                    assignee_actor_ids: vec![],
                    tags: vec![],
                    created_by: actor.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                let event = entity_event(EventKind::ItemCreate, &item.id, actor, now, &item)?;
                let id = item.id.clone();
                self.snapshot.items.insert(id.clone(), item);
                Ok(Staged::created(vec![event], id))
            }

            Mutation::EditItem {
                id,
                title,
                description,
                tags,
            } => {
                self.require_item(&id)?;
                if let Some(title) = &title {
                    if title.trim().is_empty() {
                        return Err(MutationError::InvalidArgument("item title is empty".into()));
                    }
                }
                let item = self.require_item_mut(&id)?;
                if let Some(title) = title {
                    item.title = title;
                }
                if let Some(description) = description {
                    item.description = description;
                }
                if let Some(tags) = tags {
                    item.tags = tags;
                }
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::SetStatus { id, status_id } => {
                let item = self.require_item(&id)?;
                let outline_id = item.outline_id.clone();
                if status_id != NO_STATUS {
                    let outline = self
                        .snapshot
                        .outline(&outline_id)
                        .ok_or_else(|| MutationError::NotFound(format!("outline {outline_id}")))?;
                    if outline.status_def(&status_id).is_none() {
                        return Err(MutationError::InvariantViolation(format!(
                            "status {status_id} is not defined in this outline"
                        )));
                    }
                }
                let item = self.require_item_mut(&id)?;
                item.status_id = status_id;
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::TogglePriority { id } => {
                let item = self.require_item_mut(&id)?;
                item.priority = !item.priority;
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::ToggleOnHold { id } => {
                let item = self.require_item_mut(&id)?;
                item.on_hold = !item.on_hold;
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::Assign { id, actor_id } => {
                self.require_item(&id)?;
                self.snapshot
                    .actor(&actor_id)
                    .ok_or_else(|| MutationError::NotFound(format!("actor {actor_id}")))?;
                let item = self.require_item_mut(&id)?;
                if !item.assignee_actor_ids.contains(&actor_id) {
                    item.assignee_actor_ids.push(actor_id);
                }
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::Unassign { id, actor_id } => {
                let item = self.require_item_mut(&id)?;
                item.assignee_actor_ids.retain(|a| a != &actor_id);
                item.updated_at = now;
                let event = entity_event(EventKind::ItemUpdate, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::ArchiveSubtree { id } => self.stage_archive(&id, true, actor, now),
            Mutation::UnarchiveSubtree { id } => self.stage_archive(&id, false, actor, now),

            Mutation::MoveItem {
                id,
                new_parent_id,
                position,
            } => {
                let item = self.require_item(&id)?;
                let outline_id = item.outline_id.clone();
                if let Some(parent) = &new_parent_id {
                    let parent_item = self
                        .snapshot
                        .item(parent)
                        .ok_or_else(|| MutationError::NotFound(format!("item {parent}")))?;
                    if parent_item.outline_id != outline_id {
                        return Err(MutationError::InvariantViolation(
                            "cross-outline moves are not allowed".into(),
                        ));
                    }
                    if parent == &id || self.snapshot.descendants_of(&id).contains(parent) {
                        return Err(MutationError::InvariantViolation(
                            "cannot move an item under itself".into(),
                        ));
                    }
                }
                let rank =
                    self.rank_for(&outline_id, new_parent_id.as_deref(), &position, Some(&id))?;
                let item = self.require_item_mut(&id)?;
                item.parent_id = new_parent_id;
                item.rank = rank;
                item.updated_at = now;
                let event = entity_event(EventKind::ItemMove, &id, actor, now, &item.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::DuplicateItem { id } => {
                let source = self.require_item(&id)?.clone();
                let outline = self
                    .snapshot
                    .outline(&source.outline_id)
                    .ok_or_else(|| MutationError::NotFound(format!("outline {}", source.outline_id)))?;
                let status_id = outline.initial_status().to_string();
                // Rank immediately after the source
                let rank = self.rank_for(
                    &source.outline_id,
                    source.parent_id.as_deref(),
                    &Position::After(id.clone()),
                    None,
                )?;
                let copy = Item {
                    id: self.idgen.new_id(),
                    project_id: source.project_id.clone(),
                    outline_id: source.outline_id.clone(),
                    parent_id: source.parent_id.clone(),
                    rank,
                    title: source.title.clone(),
                    description: source.description.clone(),
                    status_id,
                    priority: false,
                    on_hold: false,
                    archived: false,
                    owner_actor_id: actor.to_string(),
                    assignee_actor_ids: vec![],
                    tags: vec![],
                    created_by: actor.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                let event = entity_event(EventKind::ItemDuplicate, &copy.id, actor, now, &copy)?;
                let new_id = copy.id.clone();
                self.snapshot.items.insert(new_id.clone(), copy);
                Ok(Staged::created(vec![event], new_id))
            }

            Mutation::CreateComment {
                item_id,
                body,
                reply_to,
            } => {
                if body.trim().is_empty() {
                    return Err(MutationError::InvalidArgument("comment body is empty".into()));
                }
                self.require_item(&item_id)?;
                if let Some(parent) = &reply_to {
                    let parent_comment = self
                        .snapshot
                        .comment(parent)
                        .ok_or_else(|| MutationError::NotFound(format!("comment {parent}")))?;
                    if parent_comment.item_id != item_id {
                        return Err(MutationError::InvariantViolation(
                            "reply targets a comment on a different item".into(),
                        ));
                    }
                }
                let comment = Comment {
                    id: self.idgen.new_id(),
                    item_id,
                    author_id: actor.to_string(),
                    body,
                    reply_to_comment_id: reply_to,
                    created_at: now,
                };
                let event = entity_event(EventKind::CommentCreate, &comment.id, actor, now, &comment)?;
                let id = comment.id.clone();
                self.snapshot.comments.insert(id.clone(), comment);
                Ok(Staged::created(vec![event], id))
            }

            Mutation::EditComment { id, body } => {
                if body.trim().is_empty() {
                    return Err(MutationError::InvalidArgument("comment body is empty".into()));
                }
                let comment = self
                    .snapshot
                    .comments
                    .get_mut(&id)
                    .ok_or_else(|| MutationError::NotFound(format!("comment {id}")))?;
                comment.body = body;
                let event =
                    entity_event(EventKind::CommentUpdate, &id, actor, now, &comment.clone())?;
                Ok(Staged::simple(vec![event]))
            }

            Mutation::CreateAttachment {
                entity_kind,
                entity_id,
                original_name,
                size_bytes,
                path,
            } => {
                let exists = match entity_kind {
                    AttachmentEntity::Item => self.snapshot.item(&entity_id).is_some(),
                    AttachmentEntity::Comment => self.snapshot.comment(&entity_id).is_some(),
                };
                if !exists {
                    return Err(MutationError::NotFound(format!("entity {entity_id}")));
                }
                let attachment = Attachment {
                    id: self.idgen.new_id(),
                    entity_kind,
                    entity_id,
                    original_name,
                    size_bytes,
                    path,
                    created_by: actor.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                let event =
                    entity_event(EventKind::AttachmentCreate, &attachment.id, actor, now, &attachment)?;
                let id = attachment.id.clone();
                self.snapshot.attachments.insert(id.clone(), attachment);
                Ok(Staged::created(vec![event], id))
            }
        }
    }

    /// Archive or unarchive an item and every descendant whose flag
    /// actually flips, one event per affected item in depth-first order.
    fn stage_archive(
        &mut self,
        id: &str,
        archived: bool,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Staged, MutationError> {
        self.require_item(id)?;
        let mut targets = vec![id.to_string()];
        targets.extend(self.snapshot.descendants_of(id));

        let kind = if archived {
            EventKind::ItemArchive
        } else {
            EventKind::ItemUnarchive
        };
        let mut events = Vec::new();
        for target in targets {
            let item = self.require_item_mut(&target)?;
            if item.archived == archived {
                continue;
            }
            item.archived = archived;
            item.updated_at = now;
            events.push(entity_event(kind, &target, actor, now, &item.clone())?);
        }
        let affected = events.len();
        Ok(Staged {
            events,
            affected,
            created_id: None,
        })
    }

    fn require_item(&self, id: &str) -> Result<&Item, MutationError> {
        self.snapshot
            .item(id)
            .ok_or_else(|| MutationError::NotFound(format!("item {id}")))
    }

    fn require_item_mut(&mut self, id: &str) -> Result<&mut Item, MutationError> {
        self.snapshot
            .items
            .get_mut(id)
            .ok_or_else(|| MutationError::NotFound(format!("item {id}")))
    }

    /// Compute a rank placing an item at `position` within the sibling
    /// set of `(outline_id, parent_id)`. `moving` is excluded from the
    /// set so an item can re-rank among its current siblings.
    fn rank_for(
        &self,
        outline_id: &str,
        parent_id: Option<&str>,
        position: &Position,
        moving: Option<&str>,
    ) -> Result<String, MutationError> {
        let siblings: Vec<(String, String)> = match parent_id {
            Some(parent) => self.snapshot.children_of(parent),
            None => self.snapshot.roots_of(outline_id),
        }
        .into_iter()
        .filter(|i| Some(i.id.as_str()) != moving)
        .map(|i| (i.id.clone(), i.rank.clone()))
        .collect();

        match position {
            Position::End => Ok(rank_between(
                siblings.last().map(|(_, r)| r.as_str()),
                None,
            )),
            Position::Start => Ok(rank_between(
                None,
                siblings.first().map(|(_, r)| r.as_str()),
            )),
            Position::After(anchor) => {
                let idx = siblings
                    .iter()
                    .position(|(id, _)| id == anchor)
                    .ok_or_else(|| {
                        MutationError::InvalidArgument(format!(
                            "anchor {anchor} is not a sibling"
                        ))
                    })?;
                Ok(rank_between(
                    Some(siblings[idx].1.as_str()),
                    siblings.get(idx + 1).map(|(_, r)| r.as_str()),
                ))
            }
        }
    }

    // -- commit ----------------------------------------------------------

    /// Persist a staged change: snapshot first, then its events. On
    /// failure of either write the prior snapshot is restored, in memory
    /// and on disk, so db.json never runs ahead of the log.
    fn commit(&mut self, staged: Staged, prev: Snapshot) -> Result<Applied, MutationError> {
        let version = self.snapshot.version + 1;
        self.snapshot.version = version;
        if let Err(save_err) = self.store.save(&self.snapshot) {
            // The atomic replace left the old db.json in place
            self.snapshot = prev;
            self.snapshot.version = version;
            return Err(save_err.into());
        }
        let mut events = staged.events;
        if let Err(append_err) = self.store.append_events(&mut events) {
            // Best effort; the append error is the one worth reporting
            let _ = self.store.save(&prev);
            self.snapshot = prev;
            self.snapshot.version = version;
            return Err(append_err.into());
        }
        Ok(Applied {
            events,
            affected: staged.affected,
            created_id: staged.created_id,
        })
    }
}

/// Events staged during apply, before seq assignment
struct Staged {
    events: Vec<Event>,
    affected: usize,
    created_id: Option<String>,
}

impl Staged {
    fn simple(events: Vec<Event>) -> Self {
        let affected = events.len();
        Staged {
            events,
            affected,
            created_id: None,
        }
    }

    fn created(events: Vec<Event>, id: String) -> Self {
        let affected = events.len();
        Staged {
            events,
            affected,
            created_id: Some(id),
        }
    }
}

/// Build an event whose payload is the full post-mutation entity
fn entity_event<T: serde::Serialize>(
    kind: EventKind,
    entity_id: &str,
    actor: &str,
    at: DateTime<Utc>,
    entity: &T,
) -> Result<Event, MutationError> {
    let payload = serde_json::to_value(entity).map_err(|e| StoreError::Corrupt {
        what: "event payload".into(),
        detail: e.to_string(),
    })?;
    Ok(Event::new(kind, entity_id, actor, at, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Actor;
    use tempfile::TempDir;

    fn workspace(tmp: &TempDir) -> Workspace {
        let now = Utc::now();
        let store = Store::init(tmp.path(), Actor::human("h1", "Ada", now)).unwrap();
        let mut ws = Workspace::open_with(
            store,
            "h1".into(),
            Box::new(SystemClock),
            Box::new(SeqIdGen::new("id")),
        )
        .unwrap();
        ws.snapshot
            .actors
            .insert("agent1".into(), Actor::agent("agent1", "Bot", "h1", now));
        ws.save_snapshot().unwrap();
        ws
    }

    fn seed_outline(ws: &mut Workspace) -> (String, String) {
        let project = ws
            .apply(Mutation::CreateProject {
                name: "Main".into(),
            })
            .unwrap()
            .created_id
            .unwrap();
        let outline = ws
            .apply(Mutation::CreateOutline {
                project_id: project.clone(),
                description: "Backlog".into(),
            })
            .unwrap()
            .created_id
            .unwrap();
        (project, outline)
    }

    fn add_item(ws: &mut Workspace, outline: &str, parent: Option<&str>, title: &str) -> String {
        ws.apply(Mutation::CreateItem {
            outline_id: outline.into(),
            parent_id: parent.map(Into::into),
            title: title.into(),
            description: String::new(),
            position: Position::End,
        })
        .unwrap()
        .created_id
        .unwrap()
    }

    #[test]
    fn create_item_ranks_append_in_order() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "one");
        let b = add_item(&mut ws, &outline, None, "two");
        let ranks: Vec<&str> = ws
            .snapshot
            .roots_of(&outline)
            .iter()
            .map(|i| i.rank.as_str())
            .collect();
        assert_eq!(ranks.len(), 2);
        assert!(ranks[0] < ranks[1]);
        let order: Vec<&str> = ws
            .snapshot
            .roots_of(&outline)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(order, vec![a.as_str(), b.as_str()]);
    }

    #[test]
    fn duplicate_resets_flags_and_lands_after_source() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "alpha");
        let b = add_item(&mut ws, &outline, None, "beta");
        ws.apply(Mutation::SetStatus {
            id: a.clone(),
            status_id: "doing".into(),
        })
        .unwrap();
        ws.apply(Mutation::TogglePriority { id: a.clone() }).unwrap();
        ws.apply(Mutation::ToggleOnHold { id: a.clone() }).unwrap();

        let applied = ws.apply(Mutation::DuplicateItem { id: a.clone() }).unwrap();
        let copy_id = applied.created_id.unwrap();
        assert_eq!(applied.events.len(), 1);
        assert_eq!(applied.events[0].kind, EventKind::ItemDuplicate);

        let source = ws.snapshot.item(&a).unwrap().clone();
        let copy = ws.snapshot.item(&copy_id).unwrap();
        assert_eq!(copy.title, source.title);
        assert_eq!(copy.status_id, "todo");
        assert!(!copy.priority);
        assert!(!copy.on_hold);
        assert!(copy.assignee_actor_ids.is_empty());
        let b_rank = ws.snapshot.item(&b).unwrap().rank.clone();
        assert!(source.rank < copy.rank && copy.rank < b_rank);
        assert_eq!(ws.snapshot.items.len(), 3);
    }

    #[test]
    fn replacing_status_defs_remaps_orphaned_items() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "alpha");
        let b = add_item(&mut ws, &outline, None, "beta");
        ws.apply(Mutation::SetStatus {
            id: b.clone(),
            status_id: "done".into(),
        })
        .unwrap();

        // "todo" survives the new def list, "done" does not
        let applied = ws
            .apply(Mutation::EditOutline {
                id: outline.clone(),
                description: None,
                archived: None,
                status_defs: Some(vec![
                    StatusDef::new("todo", "To do", false),
                    StatusDef::new("blocked", "Blocked", false),
                ]),
            })
            .unwrap();
        assert_eq!(applied.events[0].kind, EventKind::OutlineUpdate);
        assert_eq!(applied.events.len(), 2);
        assert_eq!(applied.events[1].kind, EventKind::ItemUpdate);
        assert_eq!(applied.events[1].entity_id, b);

        assert_eq!(ws.snapshot.item(&a).unwrap().status_id, "todo");
        assert_eq!(ws.snapshot.item(&b).unwrap().status_id, NO_STATUS);
        let defs = &ws.snapshot.outline(&outline).unwrap().status_defs;
        for item in ws.snapshot.items.values() {
            assert!(
                item.status_id == NO_STATUS
                    || defs.iter().any(|d| d.id == item.status_id)
            );
        }
    }

    #[test]
    fn subtree_archive_counts_and_events_match() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "root");
        let b = add_item(&mut ws, &outline, Some(&a), "child");
        let c = add_item(&mut ws, &outline, Some(&b), "grandchild");
        // Pre-archive the grandchild; its flag does not flip again
        ws.apply(Mutation::ArchiveSubtree { id: c.clone() }).unwrap();

        let applied = ws.apply(Mutation::ArchiveSubtree { id: a.clone() }).unwrap();
        assert_eq!(applied.affected, 2);
        assert_eq!(applied.events.len(), 2);
        assert!(applied.events.iter().all(|e| e.kind == EventKind::ItemArchive));
        assert!(ws.snapshot.item(&a).unwrap().archived);
        assert!(ws.snapshot.item(&b).unwrap().archived);
    }

    #[test]
    fn agent_edits_attribute_to_owning_human() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        ws.current_actor_id = "agent1".into();
        let applied = ws
            .apply(Mutation::CreateItem {
                outline_id: outline,
                parent_id: None,
                title: "from the agent".into(),
                description: String::new(),
                position: Position::End,
            })
            .unwrap();
        assert!(applied.events.iter().all(|e| e.actor_id == "h1"));
        let item = ws.snapshot.item(applied.created_id.as_ref().unwrap()).unwrap();
        assert_eq!(item.created_by, "h1");
    }

    #[test]
    fn cross_outline_move_is_rejected_without_side_effects() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (project, outline) = seed_outline(&mut ws);
        let other = ws
            .apply(Mutation::CreateOutline {
                project_id: project,
                description: "Other".into(),
            })
            .unwrap()
            .created_id
            .unwrap();
        let a = add_item(&mut ws, &outline, None, "a");
        let x = add_item(&mut ws, &other, None, "x");

        let before = ws.snapshot.item(&a).unwrap().clone();
        let err = ws
            .apply(Mutation::MoveItem {
                id: a.clone(),
                new_parent_id: Some(x),
                position: Position::End,
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::InvariantViolation(_)));
        assert_eq!(ws.snapshot.item(&a).unwrap(), &before);
    }

    #[test]
    fn move_under_own_descendant_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "a");
        let b = add_item(&mut ws, &outline, Some(&a), "b");
        let err = ws
            .apply(Mutation::MoveItem {
                id: a,
                new_parent_id: Some(b),
                position: Position::End,
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::InvariantViolation(_)));
    }

    #[test]
    fn reply_must_target_same_item() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "a");
        let b = add_item(&mut ws, &outline, None, "b");
        let c1 = ws
            .apply(Mutation::CreateComment {
                item_id: a,
                body: "first".into(),
                reply_to: None,
            })
            .unwrap()
            .created_id
            .unwrap();
        let err = ws
            .apply(Mutation::CreateComment {
                item_id: b,
                body: "reply".into(),
                reply_to: Some(c1.clone()),
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::InvariantViolation(_)));

        // Same-item reply succeeds and records the parent
        let reply = ws
            .apply(Mutation::CreateComment {
                item_id: ws.snapshot.comment(&c1).unwrap().item_id.clone(),
                body: "reply".into(),
                reply_to: Some(c1.clone()),
            })
            .unwrap()
            .created_id
            .unwrap();
        assert_eq!(
            ws.snapshot.comment(&reply).unwrap().reply_to_comment_id,
            Some(c1)
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let (_, outline) = seed_outline(&mut ws);
        let a = add_item(&mut ws, &outline, None, "a");
        let err = ws
            .apply(Mutation::SetStatus {
                id: a.clone(),
                status_id: "bogus".into(),
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::InvariantViolation(_)));
        // The empty sentinel is always allowed
        ws.apply(Mutation::SetStatus {
            id: a.clone(),
            status_id: NO_STATUS.into(),
        })
        .unwrap();
        assert!(!ws.snapshot.item(&a).unwrap().has_status());
    }

    #[test]
    fn failed_validation_appends_no_event() {
        let tmp = TempDir::new().unwrap();
        let mut ws = workspace(&tmp);
        let before = ws.store().read_events(0).unwrap().len();
        let err = ws
            .apply(Mutation::TogglePriority {
                id: "missing".into(),
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::NotFound(_)));
        assert_eq!(ws.store().read_events(0).unwrap().len(), before);
    }
}

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::attachment::{Attachment, AttachmentEntity};
use super::comment::Comment;
use super::item::Item;
use super::outline::Outline;
use super::project::Project;

/// The whole in-memory workspace state.
///
/// Every collection is keyed by entity id; cross-entity links are string
/// ids resolved through the lookup methods below. `version` advances on
/// every committed mutation; projections cache against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub actors: IndexMap<String, Actor>,
    #[serde(default)]
    pub projects: IndexMap<String, Project>,
    #[serde(default)]
    pub outlines: IndexMap<String, Outline>,
    #[serde(default)]
    pub items: IndexMap<String, Item>,
    #[serde(default)]
    pub comments: IndexMap<String, Comment>,
    #[serde(default)]
    pub attachments: IndexMap<String, Attachment>,
    /// Bumped on every commit; not persisted
    #[serde(skip)]
    pub version: u64,
}

/// Item counts for an outline or project header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateMeta {
    pub total: usize,
    pub open: usize,
    pub done: usize,
    pub on_hold: usize,
    pub no_status: usize,
    pub top_level: usize,
}

/// What `aggregate_meta` counts over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateScope<'a> {
    Outline(&'a str),
    Project(&'a str),
}

impl Snapshot {
    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn outline(&self, id: &str) -> Option<&Outline> {
        self.outlines.get(id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.get(id)
    }

    pub fn attachment(&self, id: &str) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    /// Outlines of a project, in insertion order
    pub fn outlines_of(&self, project_id: &str) -> Vec<&Outline> {
        self.outlines
            .values()
            .filter(|o| o.project_id == project_id)
            .collect()
    }

    /// Top-level items of an outline, ascending by rank
    pub fn roots_of(&self, outline_id: &str) -> Vec<&Item> {
        let mut roots: Vec<&Item> = self
            .items
            .values()
            .filter(|i| i.outline_id == outline_id && i.parent_id.is_none())
            .collect();
        roots.sort_by(|a, b| a.rank.cmp(&b.rank));
        roots
    }

    /// Direct children of an item, ascending by rank
    pub fn children_of(&self, item_id: &str) -> Vec<&Item> {
        let mut children: Vec<&Item> = self
            .items
            .values()
            .filter(|i| i.parent_id.as_deref() == Some(item_id))
            .collect();
        children.sort_by(|a, b| a.rank.cmp(&b.rank));
        children
    }

    /// Sibling set an item sorts within: same outline, same parent
    pub fn siblings_of(&self, item: &Item) -> Vec<&Item> {
        match &item.parent_id {
            Some(parent) => self.children_of(parent),
            None => self.roots_of(&item.outline_id),
        }
    }

    /// All descendant ids of an item, depth-first in rank order
    pub fn descendants_of(&self, item_id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<String> = self
            .children_of(item_id)
            .iter()
            .rev()
            .map(|c| c.id.clone())
            .collect();
        while let Some(id) = stack.pop() {
            stack.extend(self.children_of(&id).iter().rev().map(|c| c.id.clone()));
            out.push(id);
        }
        out
    }

    /// Comments on an item in creation order
    pub fn comments_for(&self, item_id: &str) -> Vec<&Comment> {
        let mut comments: Vec<&Comment> = self
            .comments
            .values()
            .filter(|c| c.item_id == item_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    /// Attachments for an item or comment in creation order
    pub fn attachments_for(&self, kind: AttachmentEntity, entity_id: &str) -> Vec<&Attachment> {
        let mut atts: Vec<&Attachment> = self
            .attachments
            .values()
            .filter(|a| a.entity_kind == kind && a.entity_id == entity_id)
            .collect();
        atts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        atts
    }

    /// Count items for an outline or project header line.
    /// Archived items are excluded throughout.
    pub fn aggregate_meta(&self, scope: AggregateScope) -> AggregateMeta {
        let mut meta = AggregateMeta::default();
        for item in self.items.values() {
            let in_scope = match scope {
                AggregateScope::Outline(id) => item.outline_id == id,
                AggregateScope::Project(id) => item.project_id == id,
            };
            if !in_scope || item.archived {
                continue;
            }
            meta.total += 1;
            if item.parent_id.is_none() {
                meta.top_level += 1;
            }
            if item.on_hold {
                meta.on_hold += 1;
            }
            if !item.has_status() {
                meta.no_status += 1;
                meta.open += 1;
            } else if self
                .outline(&item.outline_id)
                .is_some_and(|o| o.is_end_state(&item.status_id))
            {
                meta.done += 1;
            } else {
                meta.open += 1;
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::default_status_defs;
    use chrono::Utc;

    fn seed() -> Snapshot {
        let now = Utc::now();
        let mut snap = Snapshot::default();
        snap.actors
            .insert("h1".into(), Actor::human("h1", "Ada", now));
        snap.projects.insert(
            "p1".into(),
            Project {
                id: "p1".into(),
                name: "Main".into(),
                archived: false,
                created_by: "h1".into(),
                created_at: now,
            },
        );
        snap.outlines.insert(
            "o1".into(),
            Outline {
                id: "o1".into(),
                project_id: "p1".into(),
                description: "Backlog".into(),
                status_defs: default_status_defs(),
                archived: false,
                created_by: "h1".into(),
                created_at: now,
            },
        );
        for (id, parent, rank, status) in [
            ("a", None, "h", "todo"),
            ("b", None, "d", "done"),
            ("c", Some("a"), "h", ""),
        ] {
            snap.items.insert(
                id.into(),
                Item {
                    id: id.into(),
                    project_id: "p1".into(),
                    outline_id: "o1".into(),
                    parent_id: parent.map(Into::into),
                    rank: rank.into(),
                    title: id.to_uppercase(),
                    description: String::new(),
                    status_id: status.into(),
                    priority: false,
                    on_hold: id == "c",
                    archived: false,
                    owner_actor_id: "h1".into(),
                    assignee_actor_ids: vec![],
                    tags: vec![],
                    created_by: "h1".into(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        snap
    }

    #[test]
    fn roots_sort_by_rank() {
        let snap = seed();
        let roots: Vec<&str> = snap.roots_of("o1").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(roots, vec!["b", "a"]);
    }

    #[test]
    fn children_and_descendants() {
        let snap = seed();
        let kids: Vec<&str> = snap.children_of("a").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(kids, vec!["c"]);
        assert_eq!(snap.descendants_of("a"), vec!["c".to_string()]);
        assert!(snap.descendants_of("c").is_empty());
    }

    #[test]
    fn aggregate_counts_by_outline() {
        let snap = seed();
        let meta = snap.aggregate_meta(AggregateScope::Outline("o1"));
        assert_eq!(meta.total, 3);
        assert_eq!(meta.top_level, 2);
        assert_eq!(meta.done, 1);
        assert_eq!(meta.open, 2);
        assert_eq!(meta.no_status, 1);
        assert_eq!(meta.on_hold, 1);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type discriminator, serialized as `entity.verb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "item.create")]
    ItemCreate,
    #[serde(rename = "item.update")]
    ItemUpdate,
    #[serde(rename = "item.archive")]
    ItemArchive,
    #[serde(rename = "item.unarchive")]
    ItemUnarchive,
    #[serde(rename = "item.move")]
    ItemMove,
    #[serde(rename = "item.duplicate")]
    ItemDuplicate,
    #[serde(rename = "comment.create")]
    CommentCreate,
    #[serde(rename = "comment.update")]
    CommentUpdate,
    #[serde(rename = "attachment.create")]
    AttachmentCreate,
    #[serde(rename = "outline.create")]
    OutlineCreate,
    #[serde(rename = "outline.update")]
    OutlineUpdate,
    #[serde(rename = "project.create")]
    ProjectCreate,
    #[serde(rename = "project.update")]
    ProjectUpdate,
}

/// One append-only audit record.
///
/// `actor_id` is always the edit-actor (the responsible human, even when
/// the change was made through an agent). `payload` carries the full
/// post-mutation entity so the log can be replayed into a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Assigned by the store on append; 0 until then
    #[serde(default)]
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub entity_id: String,
    pub actor_id: String,
    pub at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(
        kind: EventKind,
        entity_id: impl Into<String>,
        actor_id: impl Into<String>,
        at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Self {
        Event {
            seq: 0,
            kind,
            entity_id: entity_id.into(),
            actor_id: actor_id.into(),
            at,
            payload,
        }
    }
}

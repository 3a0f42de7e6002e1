use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of entity an attachment hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentEntity {
    Item,
    Comment,
}

/// A binary blob referenced by an item or a comment.
/// `path` is relative to the workspace directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub entity_kind: AttachmentEntity,
    pub entity_id: String,
    pub original_name: String,
    pub size_bytes: u64,
    pub path: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

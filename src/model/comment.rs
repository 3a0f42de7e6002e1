use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on an item. Comments form a forest per item keyed by
/// `reply_to_comment_id`; replies always target a comment on the same item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub item_id: String,
    pub author_id: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_comment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The empty status sentinel ("no status")
pub const NO_STATUS: &str = "";

/// A task inside an outline's tree.
///
/// `rank` is a short lexicographic string; sibling display order is the
/// lexicographic order of ranks within the same `(outline_id, parent_id)`
/// set. Ranks are never renumbered; insertion picks a string between the
/// neighbours (see `ops::rank`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub project_id: String,
    pub outline_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub rank: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// A member of the outline's status_defs, or `NO_STATUS`
    #[serde(default)]
    pub status_id: String,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub on_hold: bool,
    #[serde(default)]
    pub archived: bool,
    pub owner_actor_id: String,
    #[serde(default)]
    pub assignee_actor_ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn has_status(&self) -> bool {
        self.status_id != NO_STATUS
    }

    /// Case-insensitive substring match over title and description
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

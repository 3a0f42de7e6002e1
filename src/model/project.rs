use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level container grouping outlines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

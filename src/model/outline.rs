use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One status an item in this outline can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDef {
    pub id: String,
    pub label: String,
    /// End-states count toward "done" aggregates
    #[serde(default)]
    pub is_end_state: bool,
}

impl StatusDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, is_end_state: bool) -> Self {
        StatusDef {
            id: id.into(),
            label: label.into(),
            is_end_state,
        }
    }
}

/// The status vocabulary every outline starts with
pub fn default_status_defs() -> Vec<StatusDef> {
    vec![
        StatusDef::new("todo", "Todo", false),
        StatusDef::new("doing", "Doing", false),
        StatusDef::new("done", "Done", true),
    ]
}

/// A container within a project holding a tree of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub id: String,
    pub project_id: String,
    pub description: String,
    #[serde(default = "default_status_defs")]
    pub status_defs: Vec<StatusDef>,
    #[serde(default)]
    pub archived: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Outline {
    /// Look up a status definition by id
    pub fn status_def(&self, status_id: &str) -> Option<&StatusDef> {
        self.status_defs.iter().find(|d| d.id == status_id)
    }

    /// True when `status_id` names an end-state status of this outline
    pub fn is_end_state(&self, status_id: &str) -> bool {
        self.status_def(status_id).is_some_and(|d| d.is_end_state)
    }

    /// The first non-end-state status; new and duplicated items start here
    pub fn initial_status(&self) -> &str {
        self.status_defs
            .iter()
            .find(|d| !d.is_end_state)
            .map(|d| d.id.as_str())
            .unwrap_or(crate::model::item::NO_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn outline() -> Outline {
        Outline {
            id: "o1".into(),
            project_id: "p1".into(),
            description: "Test".into(),
            status_defs: default_status_defs(),
            archived: false,
            created_by: "h1".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn default_defs_mark_done_as_end_state() {
        let o = outline();
        assert!(o.is_end_state("done"));
        assert!(!o.is_end_state("todo"));
        assert!(!o.is_end_state("doing"));
        assert!(!o.is_end_state(""));
    }

    #[test]
    fn initial_status_is_first_non_end_state() {
        assert_eq!(outline().initial_status(), "todo");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of identity is performing actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Human,
    Agent,
}

/// An identity that can own, create, and be assigned to entities.
///
/// Agents carry `user_id` pointing at the human who owns them; the
/// mutation pipeline attributes an agent's edits to that human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub kind: ActorKind,
    pub name: String,
    /// Owning human, present only for agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Actor {
    pub fn human(id: impl Into<String>, name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Actor {
            id: id.into(),
            kind: ActorKind::Human,
            name: name.into(),
            user_id: None,
            created_at: at,
        }
    }

    pub fn agent(
        id: impl Into<String>,
        name: impl Into<String>,
        user_id: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Actor {
            id: id.into(),
            kind: ActorKind::Agent,
            name: name.into(),
            user_id: Some(user_id.into()),
            created_at: at,
        }
    }

    pub fn is_agent(&self) -> bool {
        self.kind == ActorKind::Agent
    }
}

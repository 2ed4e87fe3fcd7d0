use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
    pub user_role: WorkspaceRole,
    pub created_at: DateTime<Utc>,
}

/// Role of the requesting user inside a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Admin,
    Member,
    Guest,
}

impl WorkspaceRole {
    pub fn is_admin(self) -> bool {
        self == WorkspaceRole::Admin
    }
}

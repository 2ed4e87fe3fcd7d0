use serde::Serialize;
use uuid::Uuid;

use super::{User, Workspace, WorkspaceRole};

/// A resolved request session.
///
/// `workspaces` is kept in creation order. `active_workspace_id` always names
/// an element of `workspaces`, and is `None` only when the user has no
/// workspaces at all.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(skip_serializing)]
    pub token: String,
    pub user: User,
    pub workspaces: Vec<Workspace>,
    active_workspace_id: Option<Uuid>,
}

impl Session {
    /// Build a session, picking the active workspace from `preferred` in order.
    ///
    /// Preferences that do not name one of the user's workspaces are skipped;
    /// when none match, the earliest-created workspace becomes active.
    pub fn new(
        token: String,
        user: User,
        mut workspaces: Vec<Workspace>,
        preferred: &[Preference<'_>],
    ) -> Self {
        workspaces.sort_by_key(|w| w.created_at);

        let active_workspace_id = preferred
            .iter()
            .find_map(|pref| {
                workspaces
                    .iter()
                    .find(|w| pref.matches(w))
                    .map(|w| w.id)
            })
            .or_else(|| workspaces.first().map(|w| w.id));

        Self {
            token,
            user,
            workspaces,
            active_workspace_id,
        }
    }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        let id = self.active_workspace_id?;
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn workspace_by_slug(&self, slug: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.slug == slug)
    }

    pub fn workspace_by_id(&self, id: Uuid) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn role_in(&self, workspace_id: Uuid) -> Option<WorkspaceRole> {
        self.workspace_by_id(workspace_id).map(|w| w.user_role)
    }
}

/// A candidate for the active workspace.
#[derive(Debug, Clone, Copy)]
pub enum Preference<'a> {
    Slug(&'a str),
    Id(Uuid),
}

impl Preference<'_> {
    fn matches(&self, workspace: &Workspace) -> bool {
        match self {
            Preference::Slug(slug) => workspace.slug == *slug,
            Preference::Id(id) => workspace.id == *id,
        }
    }
}

use crate::api::Directory;
use crate::hosts::HostTarget;
use crate::models::{Preference, Session};

/// Resolve the session for `token`, fetching profile and memberships
/// concurrently.
///
/// Any failure is treated as "no session".
pub async fn resolve(
    directory: &dyn Directory,
    token: Option<&str>,
    host: &HostTarget,
) -> Option<Session> {
    let token = token.filter(|t| !t.is_empty())?;

    let (user, workspaces) = match tokio::try_join!(
        directory.profile(token),
        directory.workspaces(token)
    ) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!("Session resolution failed: {e}");
            return None;
        }
    };

    let mut preferred = Vec::with_capacity(2);
    if let Some(slug) = host.slug() {
        preferred.push(Preference::Slug(slug));
    }
    if let Some(id) = user.last_used_workspace_id {
        preferred.push(Preference::Id(id));
    }

    Some(Session::new(token.to_string(), user, workspaces, &preferred))
}

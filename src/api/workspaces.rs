use axum::http::StatusCode;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Workspace, WorkspaceRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspace {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMembers {
    pub emails: Vec<String>,
    pub role: WorkspaceRole,
}

/// List the workspaces the token's user belongs to, in server order.
///
/// A missing token or one the API rejects with 401 yields an empty list.
pub async fn list(client: &ApiClient, token: Option<&str>) -> Result<Vec<Workspace>, ApiError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(Vec::new());
    };

    match client
        .send::<Vec<Workspace>>(client.get("/workspaces", token))
        .await
    {
        Ok(data) => Ok(data.unwrap_or_default()),
        Err(ApiError::Api { status, .. }) if status == StatusCode::UNAUTHORIZED => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Like [`list`], but degrades to an empty list on any failure.
pub async fn list_or_empty(client: &ApiClient, token: Option<&str>) -> Vec<Workspace> {
    list(client, token).await.unwrap_or_else(|e| {
        tracing::warn!("Failed to fetch workspaces: {e}");
        Vec::new()
    })
}

pub async fn create(
    client: &ApiClient,
    token: &str,
    req: &CreateWorkspace,
) -> Result<Workspace, ApiError> {
    client
        .send::<Workspace>(client.post("/workspaces", token).json(req))
        .await?
        .ok_or(ApiError::Empty)
}

pub async fn delete(client: &ApiClient, token: &str, workspace_id: Uuid) -> Result<(), ApiError> {
    client
        .send::<IgnoredAny>(client.delete(&format!("/workspaces/{workspace_id}"), token))
        .await?;
    Ok(())
}

pub async fn invite_members(
    client: &ApiClient,
    token: &str,
    workspace_id: Uuid,
    req: &InviteMembers,
) -> Result<(), ApiError> {
    client
        .send::<IgnoredAny>(
            client
                .post(&format!("/workspaces/{workspace_id}/invitations"), token)
                .json(req),
        )
        .await?;
    Ok(())
}

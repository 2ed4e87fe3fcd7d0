use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Serialize;
use uuid::Uuid;

use crate::api::users::UpdateProfile;
use crate::api::workspaces::{CreateWorkspace, InviteMembers};
use crate::api::{self, ActionResult};
use crate::auth::extractor::{CurrentSession, request_token};
use crate::error::AppError;
use crate::hosts;
use crate::models::Workspace;
use crate::redirect::DEFAULT_WORKSPACE_PATH;
use crate::state::SharedState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResponse {
    pub redirect_url: String,
}

/// The caller's workspaces in server order. Never fails: an unknown token or
/// an unreachable API reads as no workspaces.
pub async fn list(State(state): State<SharedState>, headers: HeaderMap) -> Json<Vec<Workspace>> {
    let token = request_token(&headers, &state.config.session_cookie);
    let token = token.as_ref().map(|(token, _)| token.as_str());
    Json(api::workspaces::list_or_empty(&state.api, token).await)
}

pub async fn create(
    CurrentSession(session): CurrentSession,
    State(state): State<SharedState>,
    Json(req): Json<CreateWorkspace>,
) -> Result<ActionResult<Workspace>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Workspace name is required".to_string()));
    }
    if !hosts::is_valid_slug(&req.slug) {
        return Err(AppError::BadRequest(
            "Slug may only contain lowercase letters, numbers and single hyphens".to_string(),
        ));
    }

    let result = api::workspaces::create(&state.api, &session.token, &req).await;
    if let Ok(workspace) = &result {
        tracing::info!(slug = %workspace.slug, user_id = %session.user.id, "Workspace created");
    }
    Ok(result.into())
}

pub async fn delete(
    current: CurrentSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<ActionResult<()>, AppError> {
    current.require_admin(id)?;
    let session = &current.0;

    let result = api::workspaces::delete(&state.api, &session.token, id).await;
    if result.is_ok() {
        tracing::info!(workspace_id = %id, user_id = %session.user.id, "Workspace deleted");
    }
    Ok(result.into())
}

pub async fn invite(
    current: CurrentSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InviteMembers>,
) -> Result<ActionResult<()>, AppError> {
    current.require_admin(id)?;

    if req.emails.is_empty() || req.emails.iter().any(|e| !e.contains('@')) {
        return Err(AppError::BadRequest(
            "At least one valid email is required".to_string(),
        ));
    }

    let result = api::workspaces::invite_members(&state.api, &current.0.token, id, &req).await;
    Ok(result.into())
}

/// Make `id` the user's last used workspace and point them at it.
pub async fn switch(
    CurrentSession(session): CurrentSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<ActionResult<SwitchResponse>, AppError> {
    let workspace = session
        .workspace_by_id(id)
        .ok_or_else(|| AppError::NotFound("Workspace not found".to_string()))?;

    let req = UpdateProfile {
        last_used_workspace_id: Some(id),
        ..Default::default()
    };

    let result = api::users::update_profile(&state.api, &session.token, &req)
        .await
        .map(|_| SwitchResponse {
            redirect_url: state
                .hosts
                .workspace_url(&workspace.slug, DEFAULT_WORKSPACE_PATH),
        });
    Ok(result.into())
}

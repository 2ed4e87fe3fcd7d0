use axum::Json;
use axum::extract::State;

use crate::api::users::UpdateProfile;
use crate::api::{self, ActionResult};
use crate::auth::extractor::CurrentSession;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

pub async fn update(
    CurrentSession(session): CurrentSession,
    State(state): State<SharedState>,
    Json(req): Json<UpdateProfile>,
) -> Result<ActionResult<User>, AppError> {
    if let Some(id) = req.last_used_workspace_id {
        if session.workspace_by_id(id).is_none() {
            return Err(AppError::BadRequest(
                "Not a member of that workspace".to_string(),
            ));
        }
    }
    if req.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    Ok(api::users::update_profile(&state.api, &session.token, &req)
        .await
        .into())
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::User;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_workspace_id: Option<Uuid>,
}

pub async fn profile(client: &ApiClient, token: &str) -> Result<User, ApiError> {
    client
        .send::<User>(client.get("/users/profile", token))
        .await?
        .ok_or(ApiError::Empty)
}

pub async fn update_profile(
    client: &ApiClient,
    token: &str,
    req: &UpdateProfile,
) -> Result<User, ApiError> {
    client
        .send::<User>(client.put("/users/profile", token).json(req))
        .await?
        .ok_or(ApiError::Empty)
}

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use uuid::Uuid;

use crate::auth::resolver;
use crate::error::AppError;
use crate::models::{Session, WorkspaceRole};
use crate::state::SharedState;

/// Where a request's token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cookie,
    Bearer,
}

/// Pull the API token out of the session cookie, falling back to a bearer
/// `Authorization` header.
pub fn request_token(headers: &HeaderMap, cookie_name: &str) -> Option<(String, TokenSource)> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name).filter(|c| !c.value().is_empty()) {
        return Some((cookie.value().to_string(), TokenSource::Cookie));
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| (t.to_string(), TokenSource::Bearer))
}

/// Cookie that clears the session cookie on every host sharing it.
pub fn removal_cookie(name: &str, domain: Option<String>) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), "");
    cookie.set_path("/");
    if let Some(domain) = domain {
        cookie.set_domain(domain);
    }
    cookie.make_removal();
    cookie
}

/// The signed-in user's session, for JSON routes.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl CurrentSession {
    /// Fail unless the user is an admin of `workspace_id`.
    pub fn require_admin(&self, workspace_id: Uuid) -> Result<(), AppError> {
        match self.0.role_in(workspace_id) {
            Some(WorkspaceRole::Admin) => Ok(()),
            Some(_) => Err(AppError::Forbidden(
                "Workspace admin access required".to_string(),
            )),
            None => Err(AppError::NotFound("Workspace not found".to_string())),
        }
    }
}

impl FromRequestParts<SharedState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CurrentSession(session.clone()));
        }

        let (token, _) = request_token(&parts.headers, &state.config.session_cookie)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let host = state.hosts.from_headers(&parts.headers);
        resolver::resolve(state.directory.as_ref(), Some(&token), &host)
            .await
            .map(CurrentSession)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))
    }
}

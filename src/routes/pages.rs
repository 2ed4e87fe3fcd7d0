use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, HOST};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;

use crate::auth::extractor::{TokenSource, request_token};
use crate::error::AppError;
use crate::hosts::HostTarget;
use crate::models::Session;
use crate::state::SharedState;

const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_WORKSPACE_SLUG: &str = "x-workspace-slug";
const X_USER_ID: &str = "x-user-id";

fn copy_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for (name, value) in from {
        if !HOP_BY_HOP.contains(&name.as_str()) {
            to.append(name.clone(), value.clone());
        }
    }
}

/// Headers for the renderer: the client's own, minus hop-by-hop and identity
/// headers, plus the identity resolved by the gate.
fn forwarded_headers(
    incoming: &HeaderMap,
    session: Option<&Session>,
    host: &HostTarget,
    cookie_name: &str,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    copy_headers(incoming, &mut headers);
    headers.remove(HOST);
    headers.remove(X_WORKSPACE_SLUG);
    headers.remove(X_USER_ID);

    if let Some(value) = incoming.get(HOST) {
        headers.insert(X_FORWARDED_HOST, value.clone());
    }

    if let Some(slug) = host.slug() {
        let value = HeaderValue::from_str(slug).map_err(|e| AppError::Internal(e.to_string()))?;
        headers.insert(X_WORKSPACE_SLUG, value);
    }

    let Some(session) = session else {
        return Ok(headers);
    };

    let user_id = HeaderValue::from_str(&session.user.id.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    headers.insert(X_USER_ID, user_id);

    // The renderer reads the cookie itself; only bearer clients need the header.
    let has_cookie = matches!(
        request_token(incoming, cookie_name),
        Some((_, TokenSource::Cookie))
    );
    if has_cookie {
        headers.remove(AUTHORIZATION);
    } else {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", session.token))
            .map_err(|_| AppError::BadRequest("Invalid token".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
    }

    Ok(headers)
}

/// Forward an allowed page request to the renderer.
pub async fn forward(State(state): State<SharedState>, req: Request) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let host = parts
        .extensions
        .get::<HostTarget>()
        .cloned()
        .unwrap_or(HostTarget::Apex);
    let session = parts.extensions.get::<Session>();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.config.renderer_url, path_and_query);

    let headers = forwarded_headers(&parts.headers, session, &host, &state.config.session_cookie)?;
    let body = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {e}")))?;

    let upstream = state
        .renderer
        .request(parts.method.clone(), &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::BadGateway(format!("Renderer request failed: {e}")))?;

    let status = upstream.status();
    let mut upstream_headers = HeaderMap::new();
    copy_headers(upstream.headers(), &mut upstream_headers);
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| AppError::BadGateway(format!("Renderer response failed: {e}")))?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = upstream_headers;
    Ok(response)
}

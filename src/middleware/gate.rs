use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::auth::extractor::{TokenSource, removal_cookie, request_token};
use crate::auth::resolver;
use crate::hosts::HostResolver;
use crate::redirect::{self, Decision, DecisionContext, RouteClass};
use crate::state::SharedState;

/// Resolve the session for every page request and either let it through or
/// redirect it.
///
/// Paths that are not in canonical form are redirected to it first, so the
/// renderer only ever sees the path the decision was made on. On `Allow` the
/// resolved `Session` and the request's `HostTarget` are placed in request
/// extensions.
pub async fn gate(State(state): State<SharedState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let canonical = redirect::normalize_path(&path);
    if canonical != path {
        tracing::debug!(%path, %canonical, "Redirecting to canonical path");
        let target = match query.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => format!("{canonical}?{q}"),
            None => canonical,
        };
        return Redirect::temporary(&target).into_response();
    }

    let host = state.hosts.from_headers(req.headers());

    if redirect::classify(&path) == RouteClass::Open {
        req.extensions_mut().insert(host);
        return next.run(req).await;
    }

    let token = request_token(req.headers(), &state.config.session_cookie);
    let session = match &token {
        Some((token, _)) => resolver::resolve(state.directory.as_ref(), Some(token), &host).await,
        None => None,
    };

    // A cookie that no longer resolves to a session is dropped, whatever the decision.
    let stale_cookie = session.is_none() && matches!(token, Some((_, TokenSource::Cookie)));

    let decision = redirect::decide(&DecisionContext {
        session: session.as_ref(),
        host: &host,
        path: &path,
        query: query.as_deref(),
    });

    let response = if decision == Decision::Allow {
        if let Some(session) = session {
            req.extensions_mut().insert(session);
        }
        req.extensions_mut().insert(host);
        next.run(req).await
    } else {
        tracing::debug!(?decision, %path, "Redirecting page request");
        Redirect::temporary(&location(&state.hosts, &decision)).into_response()
    };

    if stale_cookie {
        let jar = CookieJar::new().add(removal_cookie(
            &state.config.session_cookie,
            state.hosts.cookie_domain(),
        ));
        (jar, response).into_response()
    } else {
        response
    }
}

/// Target URL for a redirect decision. Login and onboarding stay on the
/// current host; workspace redirects are absolute.
pub fn location(hosts: &HostResolver, decision: &Decision) -> String {
    match decision {
        Decision::Allow => "/".to_string(),
        Decision::RedirectToLogin { callback_url } => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("callbackUrl", callback_url)
                .finish();
            format!("{}?{query}", redirect::LOGIN_PATH)
        }
        Decision::RedirectToOnboarding(step) => step.path().to_string(),
        Decision::RedirectToWorkspace { slug, path } => hosts.workspace_url(slug, path),
    }
}

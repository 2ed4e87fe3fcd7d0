pub mod auth;
pub mod pages;
pub mod profile;
pub mod session;
pub mod workspaces;

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/auth/logout", post(auth::logout))
        .route("/api/session", get(session::current))
        // Profile
        .route("/api/profile", put(profile::update))
        // Workspaces
        .route(
            "/api/workspaces",
            get(workspaces::list).post(workspaces::create),
        )
        .route("/api/workspaces/{id}", delete(workspaces::delete))
        .route(
            "/api/workspaces/{id}/invitations",
            post(workspaces::invite),
        )
        .route("/api/workspaces/{id}/switch", post(workspaces::switch))
}

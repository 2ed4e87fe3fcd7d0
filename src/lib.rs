pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod hosts;
pub mod middleware;
pub mod models;
pub mod redirect;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::{MethodRouter, any};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::gate::gate;
use crate::state::{AppState, SharedState};

pub fn build_app(state: AppState) -> Router {
    let state: SharedState = Arc::new(state);

    // Every path the API routes do not claim is a page, and pages go through the gate.
    let pages: MethodRouter = any(routes::pages::forward)
        .layer(axum::middleware::from_fn_with_state(state.clone(), gate))
        .with_state(state.clone());

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .fallback_service(pages)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

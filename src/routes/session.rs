use axum::Json;

use crate::auth::extractor::CurrentSession;
use crate::models::Session;

pub async fn current(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}

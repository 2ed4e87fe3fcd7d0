use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::CookieJar;

use crate::auth::extractor::removal_cookie;
use crate::redirect::LOGIN_PATH;
use crate::state::SharedState;

/// Drop the session cookie and send the user back to login.
pub async fn logout(State(state): State<SharedState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let had_session = jar.get(&state.config.session_cookie).is_some();
    let jar = jar.add(removal_cookie(
        &state.config.session_cookie,
        state.hosts.cookie_domain(),
    ));

    if had_session {
        tracing::info!("Session cookie cleared");
    }

    (jar, Redirect::to(LOGIN_PATH))
}

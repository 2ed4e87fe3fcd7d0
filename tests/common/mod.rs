use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{Value, json};

use complexus_edge::config::{Config, Environment};
use complexus_edge::state::AppState;

pub const ALICE: &str = "alice-token";
pub const BOB: &str = "bob-token";
pub const CAROL: &str = "carol-token";
pub const BROKEN: &str = "broken-token";

pub const ACME_ID: &str = "0190a1b2-0000-7000-8000-000000000001";
pub const GLOBEX_ID: &str = "0190a1b2-0000-7000-8000-000000000002";

/// A request the mock API received on a write path.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub token: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockApi {
    users: Arc<HashMap<String, Value>>,
    workspaces: Arc<HashMap<String, Value>>,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn envelope_error(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "data": null, "error": { "message": message } }))).into_response()
}

fn lookup(headers: &HeaderMap, table: &HashMap<String, Value>) -> axum::response::Response {
    match bearer(headers).as_deref() {
        Some(BROKEN) => envelope_error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"),
        Some(token) => match table.get(token) {
            Some(data) => Json(json!({ "data": data })).into_response(),
            None => envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
        },
        None => envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

impl MockApi {
    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: Value) {
        self.recorded.lock().unwrap().push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            token: bearer(headers),
            body,
        });
    }
}

async fn list_workspaces(State(api): State<MockApi>, headers: HeaderMap) -> axum::response::Response {
    lookup(&headers, &api.workspaces)
}

async fn get_profile(State(api): State<MockApi>, headers: HeaderMap) -> axum::response::Response {
    lookup(&headers, &api.users)
}

async fn update_profile(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    api.record("PUT", "/users/profile", &headers, body.clone());
    if body["username"] == "taken" {
        return envelope_error(StatusCode::CONFLICT, "Username is already taken");
    }
    let Some(mut user) = bearer(&headers).and_then(|t| api.users.get(&t).cloned()) else {
        return envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if let (Some(user), Some(patch)) = (user.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            user.insert(k.clone(), v.clone());
        }
    }
    Json(json!({ "data": user })).into_response()
}

async fn create_workspace(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    api.record("POST", "/workspaces", &headers, body.clone());
    if body["slug"] == "taken" {
        return envelope_error(StatusCode::CONFLICT, "Workspace slug is already in use");
    }
    Json(json!({
        "data": {
            "id": "0190a1b2-0000-7000-8000-0000000000ff",
            "name": body["name"],
            "slug": body["slug"],
            "userRole": "admin",
            "createdAt": "2024-05-01T00:00:00Z"
        }
    }))
    .into_response()
}

async fn delete_workspace(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> axum::response::Response {
    api.record("DELETE", &format!("/workspaces/{id}"), &headers, Value::Null);
    Json(json!({ "data": null })).into_response()
}

async fn invite_members(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> axum::response::Response {
    api.record("POST", &format!("/workspaces/{id}/invitations"), &headers, body);
    StatusCode::NO_CONTENT.into_response()
}

/// Echo what the renderer received, so tests can see what the gate forwarded.
async fn render(req: Request) -> Json<Value> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": req.method().as_str(),
        "path": req.uri().path(),
        "query": req.uri().query(),
        "workspace": header("x-workspace-slug"),
        "userId": header("x-user-id"),
        "authorization": header("authorization"),
        "forwardedHost": header("x-forwarded-host"),
    }))
}

fn workspace(id: &str, slug: &str, role: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "name": slug.to_uppercase(),
        "slug": slug,
        "color": "#0ea5e9",
        "userRole": role,
        "createdAt": created_at,
    })
}

fn user(id: &str, name: &str, last_used: Option<&str>) -> Value {
    json!({
        "id": id,
        "email": format!("{}@example.com", name.to_lowercase()),
        "username": name.to_lowercase(),
        "fullName": name,
        "avatarUrl": null,
        "lastUsedWorkspaceId": last_used,
    })
}

fn fixtures() -> (HashMap<String, Value>, HashMap<String, Value>) {
    let mut users = HashMap::new();
    users.insert(
        ALICE.to_string(),
        user("0190a1b2-0000-7000-8000-0000000000a1", "Alice", None),
    );
    users.insert(
        BOB.to_string(),
        user("0190a1b2-0000-7000-8000-0000000000b0", "Bob", None),
    );
    users.insert(
        CAROL.to_string(),
        user("0190a1b2-0000-7000-8000-0000000000c0", "Carol", Some(GLOBEX_ID)),
    );

    let mut workspaces = HashMap::new();
    // Served newest first; creation order puts acme first.
    workspaces.insert(
        ALICE.to_string(),
        json!([
            workspace(GLOBEX_ID, "globex", "member", "2024-02-01T09:00:00Z"),
            workspace(ACME_ID, "acme", "admin", "2024-01-01T09:00:00Z"),
        ]),
    );
    workspaces.insert(BOB.to_string(), json!([]));
    workspaces.insert(
        CAROL.to_string(),
        json!([
            workspace(ACME_ID, "acme", "guest", "2024-01-01T09:00:00Z"),
            workspace(GLOBEX_ID, "globex", "member", "2024-02-01T09:00:00Z"),
        ]),
    );

    (users, workspaces)
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    addr
}

/// Start a mock remote API, returning its address and the write log.
pub async fn spawn_mock_api() -> (SocketAddr, Arc<Mutex<Vec<Recorded>>>) {
    let (users, workspaces) = fixtures();
    let api = MockApi {
        users: Arc::new(users),
        workspaces: Arc::new(workspaces),
        recorded: Arc::new(Mutex::new(Vec::new())),
    };
    let recorded = api.recorded.clone();

    let router = Router::new()
        .route("/workspaces", get(list_workspaces).post(create_workspace))
        .route("/workspaces/{id}", delete(delete_workspace))
        .route("/workspaces/{id}/invitations", post(invite_members))
        .route("/users/profile", get(get_profile).put(update_profile))
        .with_state(api);

    (serve(router).await, recorded)
}

/// A running edge instance wired to a mock API and an echoing renderer.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET a page as if addressed to `host`, carrying `token` in the session cookie.
    pub async fn page(&self, host: &str, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut req = self.client.get(self.url(path)).header("host", host);
        if let Some(token) = token {
            req = req.header("cookie", format!("complexus_session={token}"));
        }
        req.send().await.expect("page request failed")
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn test_config(api_addr: SocketAddr, renderer_addr: SocketAddr) -> Config {
    Config {
        api_url: format!("http://{api_addr}"),
        renderer_url: format!("http://{renderer_addr}"),
        environment: Environment::Development,
        domain: "localhost".to_string(),
        dev_port: 3000,
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        session_cookie: "complexus_session".to_string(),
        api_timeout: Duration::from_secs(5),
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let (api_addr, recorded) = spawn_mock_api().await;
    let renderer_addr = serve(Router::new().fallback(render)).await;

    let state = AppState::new(test_config(api_addr, renderer_addr)).expect("Failed to build state");
    let addr = serve(complexus_edge::build_app(state)).await;

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        recorded,
    }
}

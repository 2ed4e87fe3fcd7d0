pub mod users;
pub mod workspaces;

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{User, Workspace};

/// Response wrapper used by every remote API endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Outcome of a write path, in the same `{ data, error }` shape the API uses.
#[derive(Debug, Serialize)]
pub struct ActionResult<T> {
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn failed(err: &ApiError) -> Self {
        Self {
            data: None,
            error: Some(ErrorBody {
                message: err.message(),
            }),
            status: err.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<Result<T, ApiError>> for ActionResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ActionResult::ok(data),
            Err(err) => {
                tracing::warn!("API write failed: {err}");
                ActionResult::failed(&err)
            }
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        (self.status, axum::Json(&self)).into_response()
    }
}

/// Authenticated client for the remote REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub(crate) fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub(crate) fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub(crate) fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Send a request and unwrap the envelope.
    ///
    /// Non-success statuses and error envelopes become `ApiError::Api` carrying
    /// the server's message verbatim.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if body.is_empty() && status.is_success() {
            return Ok(None);
        }

        let envelope = match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Api {
                    status,
                    message: status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string(),
                });
            }
            Err(e) => return Err(ApiError::Decode(e.to_string())),
        };

        if let Some(error) = envelope.error {
            return Err(ApiError::Api {
                status: if status.is_success() {
                    StatusCode::BAD_REQUEST
                } else {
                    status
                },
                message: error.message,
            });
        }

        if !status.is_success() {
            return Err(ApiError::Api {
                status,
                message: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            });
        }

        Ok(envelope.data)
    }
}

/// Read access to a user's identity and memberships.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn profile(&self, token: &str) -> Result<User, ApiError>;
    async fn workspaces(&self, token: &str) -> Result<Vec<Workspace>, ApiError>;
}

#[async_trait]
impl Directory for ApiClient {
    async fn profile(&self, token: &str) -> Result<User, ApiError> {
        users::profile(self, token).await
    }

    async fn workspaces(&self, token: &str) -> Result<Vec<Workspace>, ApiError> {
        workspaces::list(self, Some(token)).await
    }
}

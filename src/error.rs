use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Failure talking to the remote API.
#[derive(Debug)]
pub enum ApiError {
    /// The API answered with an error envelope.
    Api { status: StatusCode, message: String },
    Transport(reqwest::Error),
    Decode(String),
    /// The API answered successfully but `data` was null.
    Empty,
}

impl ApiError {
    /// Message suitable for surfacing to the caller.
    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Transport(_) => "Unable to reach the API".to_string(),
            ApiError::Decode(_) => "Unexpected response from the API".to_string(),
            ApiError::Empty => "The API returned no data".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Api { status, .. } => *status,
            ApiError::Transport(_) | ApiError::Decode(_) | ApiError::Empty => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Api { status, message } => write!(f, "API error ({status}): {message}"),
            ApiError::Transport(err) => write!(f, "API transport error: {err}"),
            ApiError::Decode(msg) => write!(f, "API decode error: {msg}"),
            ApiError::Empty => write!(f, "API returned an empty envelope"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Internal(String),
    BadGateway(String),
    Upstream(ApiError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::BadGateway(msg) => write!(f, "Bad Gateway: {msg}"),
            AppError::Upstream(err) => write!(f, "Upstream Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadGateway(msg) => {
                tracing::error!("Bad gateway: {msg}");
                (StatusCode::BAD_GATEWAY, "Upstream unavailable".to_string())
            }
            AppError::Upstream(err) => {
                tracing::warn!("Upstream error: {err}");
                (err.status(), err.message())
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Upstream(err)
    }
}

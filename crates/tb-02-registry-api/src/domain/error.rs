//! Registry API error types.
//!
//! Every failure a client can see is an `ApiError`, rendered as a JSON object
//! with an `error` field plus any extra context fields.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use std::fmt;

/// HTTP-facing error
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Response status
    pub status: StatusCode,
    /// Value of the `error` field
    pub message: String,
    /// Extra fields merged next to `error`
    pub data: Option<Map<String, Value>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }

    /// Attach one extra field.
    #[must_use]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Request path escapes the registry root or is otherwise unusable
    pub fn invalid_path() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid registry path")
    }

    /// Registry entry does not exist
    pub fn entry_not_found(path: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Registry entry not found").with_field("path", path.into())
    }

    /// No such route, or no such relation entity
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    /// File extension has no registered reader
    pub fn unsupported_media_type(extension: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported registry media type")
            .with_field("extension", extension.into())
    }

    /// Registry file exists but could not be decoded
    pub fn malformed(path: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Malformed registry resource")
            .with_field("path", path.into())
    }

    /// Request body is missing required fields or is not JSON
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, details)
    }

    /// Missing or wrong API key
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// Anything else. Details are logged, never returned.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// JSON body for this error
    pub fn body(&self) -> Value {
        let mut body = self.data.clone().unwrap_or_default();
        body.insert("error".to_string(), Value::String(self.message.clone()));
        Value::Object(body)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body();
        (self.status, Json(body)).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Service lifecycle errors (not client-visible)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    /// Server socket bind error
    #[error("server bind error on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Server stopped with an I/O error
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    /// `start` called twice
    #[error("service already running")]
    AlreadyRunning,
}

//! Shared error types.
//!
//! `ApiError` is what the HTTP layer produces. `RequestFailure` is the
//! serializable form kept in chat state so readers can pick user-facing
//! copy by `ErrorKind` without holding on to transport errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API error type for client-side use
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Http { status, .. } => ErrorKind::from_status(*status),
            ApiError::Deserialize(_) => ErrorKind::Unknown,
        }
    }

    /// The server's error body when there is one, otherwise the error message.
    ///
    /// JSON bodies are kept structured; anything else becomes a string.
    pub fn detail(&self) -> Value {
        match self {
            ApiError::Http { body, .. } if !body.trim().is_empty() => {
                serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.clone()))
            }
            other => Value::String(other.to_string()),
        }
    }
}

/// Coarse classification used to choose what to tell the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    Unauthorized,
    Conflict,
    Server,
    Unknown,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Unauthorized,
            409 | 422 => ErrorKind::Conflict,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }
}

/// A failed request as recorded in chat state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestFailure {
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: Value,
}

impl RequestFailure {
    /// Best human-readable line for this failure.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(s) => s.clone(),
            Value::Null => format!("{:?}", self.kind),
            other => detail_from_value(other).unwrap_or_else(|| other.to_string()),
        }
    }
}

impl From<&ApiError> for RequestFailure {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind(),
            status: err.status(),
            detail: err.detail(),
        }
    }
}

impl std::fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for RequestFailure {}

/// Attempt to pull a user-facing message out of an error body.
/// Understands `{message}`, `{error}` and RFC7807 `{detail, title}` shapes.
pub fn try_error_detail(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<Value>(body).ok()?;
    detail_from_value(&parsed)
}

fn detail_from_value(value: &Value) -> Option<String> {
    ["detail", "message", "error", "title"]
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

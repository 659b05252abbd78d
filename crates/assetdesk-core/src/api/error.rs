//! Normalized API errors.

use std::fmt;

use serde_json::Value;

/// Message used when the server gives no usable error text.
pub const FALLBACK_MESSAGE: &str = "Request failed";

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Non-success HTTP status (4xx, 5xx)
    HttpStatus,
    /// Connection failure, DNS error or timeout
    Transport,
    /// Success response whose body was not the expected JSON
    Decode,
    /// Rejected on the client before any request was sent
    Validation,
    /// Local session file could not be read or written
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Decode => write!(f, "decode"),
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Error surfaced to workflows; `message` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status for `HttpStatus` errors
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Builds an HTTP status error from a response body.
    ///
    /// Uses the body's `error` field, then `message`, then the fallback.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::HttpStatus,
            status: Some(status),
            message: extract_message(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(ApiErrorKind::Storage, format!("{err:#}"))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

fn extract_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .filter_map(|field| json.get(field).and_then(Value::as_str))
        .find(|msg| !msg.trim().is_empty())
        .map(str::to_string)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

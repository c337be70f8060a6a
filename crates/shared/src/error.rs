use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            500..=599 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// A non-2xx answer from the backend, reduced to something a person can read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, status: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    /// Body message first, then the status line, then the generic fallback.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = message_from_body(body)
            .or_else(|| reason.map(|reason| format!("{status} {reason}")))
            .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());
        Self::new(ErrorCode::from_status(status), status, message)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pulls a readable message out of an error response body.
///
/// Accepts `{"message": ..}` / `{"error": ..}` objects, a bare JSON string, or
/// plain text. Empty bodies and JSON without a usable message yield `None`.
pub fn message_from_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return match value {
            serde_json::Value::String(text) => non_empty(text),
            serde_json::Value::Object(_) => serde_json::from_value::<ErrorBody>(value)
                .ok()
                .and_then(|parsed| parsed.message.or(parsed.error))
                .and_then(non_empty),
            _ => None,
        };
    }

    non_empty(body.to_string())
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

//! Error taxonomy for backend calls made by the directory client.

use shared::error::{ApiError, GENERIC_ERROR_MESSAGE};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No response was received: connect failure, timeout, interrupted body.
    #[error("{0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Backend(#[from] ApiError),
    /// A 2xx answer whose body could not be decoded.
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Human-readable text suitable for an inline error or a notification.
    pub fn message(&self) -> String {
        self.message_or(GENERIC_ERROR_MESSAGE)
    }

    /// Like [`ClientError::message`], with a caller-chosen fallback for errors
    /// that carry no text.
    pub fn message_or(&self, fallback: &str) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            fallback.to_string()
        } else {
            text
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend(err) => Some(err.status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

//! Transient notifications raised by directory operations.

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Backend,
}

impl From<&ClientError> for ErrorCategory {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Transport(_) | ClientError::InvalidUrl(_) => Self::Transport,
            ClientError::Backend(_) | ClientError::InvalidResponse(_) => Self::Backend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub category: Option<ErrorCategory>,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            category: None,
            message: message.into(),
        }
    }

    pub fn failure(err: &ClientError, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            category: Some(ErrorCategory::from(err)),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

//! Error types for the Composio SDK.

use composio_core::DecodeError;
use std::fmt;

/// Result type for SDK operations.
pub type ComposioResult<T> = Result<T, ComposioError>;

/// Error types that can occur when calling the broker.
#[derive(Debug, thiserror::Error)]
pub enum ComposioError {
    /// Missing or unusable credentials or client settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request never produced a response (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The broker answered with something that is not the expected JSON.
    #[error("Malformed response for {context}: {message}")]
    MalformedResponse { context: String, message: String },

    /// The broker reported a failure for an action or management call.
    #[error("Action {action} failed: {message}")]
    Action {
        action: String,
        message: String,
        status: Option<u16>,
    },

    /// The response did not match the expected model.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// The four failure classes every error maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Action,
    Decode,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Action => "action",
            Self::Decode => "decode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ComposioError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Action {
            action: action.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::InvalidUrl(_) => ErrorKind::Configuration,
            Self::Transport(_) | Self::MalformedResponse { .. } => ErrorKind::Transport,
            Self::Action { .. } => ErrorKind::Action,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Action or management call the error is attributed to.
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Action { action, .. } => Some(action),
            Self::MalformedResponse { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether a caller-side retry could plausibly succeed. The SDK itself
    /// never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Action {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ComposioError::config("x").kind(), ErrorKind::Configuration);
        assert_eq!(
            ComposioError::action_failed("NOTION_GET_ABOUT_ME", "nope").kind(),
            ErrorKind::Action
        );
        assert_eq!(
            ComposioError::MalformedResponse {
                context: "list_toolkits".to_string(),
                message: "eof".to_string()
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            ComposioError::from(DecodeError::missing("Page", "id")).kind(),
            ErrorKind::Decode
        );
    }

    #[test]
    fn test_action_error_message_includes_action() {
        let err = ComposioError::action_failed("ZOOM_DELETE_A_MEETING", "Action not found");

        let message = err.to_string();
        assert!(message.contains("ZOOM_DELETE_A_MEETING"));
        assert!(message.contains("Action not found"));
        assert_eq!(err.action(), Some("ZOOM_DELETE_A_MEETING"));
    }

    #[test]
    fn test_decode_error_names_entity_and_field() {
        let err = ComposioError::from(DecodeError::missing("Page", "id"));

        let message = err.to_string();
        assert!(message.contains("Page"));
        assert!(message.contains("id"));
    }

    #[test]
    fn test_retryable_statuses() {
        let throttled = ComposioError::Action {
            action: "list_connections".to_string(),
            message: "slow down".to_string(),
            status: Some(429),
        };
        let rejected = ComposioError::Action {
            action: "list_connections".to_string(),
            message: "bad filter".to_string(),
            status: Some(400),
        };

        assert!(throttled.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!ComposioError::config("missing key").is_retryable());
    }
}

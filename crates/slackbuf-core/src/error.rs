//! Unified error types for slackbuf.

use thiserror::Error;

/// Result type alias using SlackBufError.
pub type Result<T> = std::result::Result<T, SlackBufError>;

#[derive(Error, Debug)]
pub enum SlackBufError {
    // Delivery errors
    #[error("Failed to marshal json body: {0}")]
    Encode(String),

    #[error("Failed to make http request: {0}")]
    Request(String),

    #[error("Failed to request slack: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Slack responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Slack API error: {0}")]
    Api(String),

    // Ingress errors
    #[error("Message queue full: {0}")]
    QueueFull(String),

    #[error("Buffer service closed: {0}")]
    Closed(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl SlackBufError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    /// Whether the failure happened on the wire rather than while building the request.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout(_) | Self::Status { .. } | Self::Api(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SlackBufError::Transport("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
        assert!(err.to_string().starts_with("Failed to request slack"));
    }

    #[test]
    fn test_status_display() {
        let err = SlackBufError::Status { status: 500, body: "oops".into() };
        assert_eq!(err.to_string(), "Slack responded with 500: oops");
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(SlackBufError::transport("x"), SlackBufError::Transport(_)));
        assert!(matches!(SlackBufError::config("x"), SlackBufError::Config(_)));
        assert!(matches!(SlackBufError::closed("x"), SlackBufError::Closed(_)));
    }

    #[test]
    fn test_delivery_failure_classification() {
        assert!(SlackBufError::Timeout("5s".into()).is_delivery_failure());
        assert!(SlackBufError::Api("channel_not_found".into()).is_delivery_failure());
        assert!(!SlackBufError::Encode("bad".into()).is_delivery_failure());
        assert!(!SlackBufError::QueueFull("full".into()).is_delivery_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SlackBufError = io_err.into();
        assert!(matches!(err, SlackBufError::Io(_)));
    }
}

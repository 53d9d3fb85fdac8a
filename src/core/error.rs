//! Custom error types for toolpilot
//!
//! Provides a unified error handling system across all modules.

use std::time::Duration;

use thiserror::Error;

/// Main error type for toolpilot operations
#[derive(Error, Debug)]
pub enum ToolpilotError {
    /// Connection-level failure talking to the completion endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-success HTTP status from the completion endpoint
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Response body could not be read as JSON at all
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Tool rejected at registration time
    #[error("Tool registration error: {0}")]
    ToolRegistration(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for toolpilot operations
pub type Result<T> = std::result::Result<T, ToolpilotError>;

impl ToolpilotError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an upstream error from a status code and response body
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            body: body.into(),
        }
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a tool registration error
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::ToolRegistration(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// HTTP status of an upstream error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_and_status() {
        let err = ToolpilotError::upstream(500, "boom");
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.to_string(), "Upstream error (500): boom");
    }

    #[test]
    fn test_timeout_display() {
        let err = ToolpilotError::Timeout(Duration::from_secs(30));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timed out after 30s");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_tool_error_prefix() {
        let err = ToolpilotError::tool("division by zero");
        assert_eq!(err.to_string(), "Tool execution error: division by zero");
    }
}

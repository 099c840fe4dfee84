//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Redline
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RedlineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Redline operations
pub type Result<T> = std::result::Result<T, RedlineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RedlineError::Auth("session rejected".to_string());
        assert_eq!(err.to_string(), "Authentication error: session rejected");
    }

    #[test]
    fn test_error_serialization_roundtrip() {
        let err = RedlineError::Validation("comment body is empty".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"Validation\""));

        let back: RedlineError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, RedlineError::Validation(msg) if msg == "comment body is empty"));
    }
}

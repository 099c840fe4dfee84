//! Gateway error types
//!
//! Provides error classification for gateway operations. The taxonomy
//! distinguishes recoverable authentication challenges (handled internally
//! by diversion and replay) from terminal failures surfaced to callers.

use std::time::Duration;

use thiserror::Error;

/// Categories of gateway errors for telemetry and recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication failures - a new episode may succeed after re-login
    Authentication,
    /// Network/connection errors and timeouts
    Network,
    /// Server errors (5xx)
    Server,
    /// Validation errors (4xx except 401)
    Validation,
    /// Configuration and internal errors - non-recoverable
    Config,
}

/// Errors surfaced by the request gateway
///
/// A 401 challenge itself never appears here: it is represented internally
/// by the interceptor chain's divert verdict and is fully absorbed by the
/// replay machinery. Callers only see an authentication error when an
/// episode ends in terminal failure.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("user cancelled authentication")]
    UserCancelled,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal gateway error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailed(_) | Self::UserCancelled => ErrorCategory::Authentication,
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Server(_) => ErrorCategory::Server,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Config(_) | Self::Internal(_) => ErrorCategory::Config,
        }
    }

    /// Whether retrying the operation later could succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication | ErrorCategory::Network | ErrorCategory::Server
        )
    }
}

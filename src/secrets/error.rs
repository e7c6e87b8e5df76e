//! Error types for secrets-engine operations.

use thiserror::Error;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while talking to the remote secrets engine.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// Failed to reach the secrets backend.
    #[error("Backend connection failed: {message}")]
    ConnectionFailed { message: String },

    /// AppRole login was refused.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The backend answered but rejected the operation.
    #[error("Backend error: {message}")]
    BackendError { message: String, status: Option<u16> },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

impl SecretsError {
    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: message.into() }
    }

    /// Create an authentication failed error.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed { message: message.into() }
    }

    /// Create a backend error.
    pub fn backend_error(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::BackendError { message: message.into(), status }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// Whether retrying the same call later could succeed.
    ///
    /// Transport failures and 5xx answers are transient; AppRole refusals and 4xx
    /// answers are not. Nothing in the issuance path retries; the hint is logged.
    pub fn is_retryable(&self) -> bool {
        match self {
            SecretsError::ConnectionFailed { .. } => true,
            SecretsError::BackendError { status: Some(status), .. } => *status >= 500,
            SecretsError::BackendError { status: None, .. } => false,
            SecretsError::AuthenticationFailed { .. } | SecretsError::ConfigError { .. } => false,
        }
    }
}

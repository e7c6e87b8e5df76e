//! # Error Handling
//!
//! Error types for the certificate authority, built on `thiserror`.
//!
//! Every failure in the issuance pipeline is classified where it happens into one
//! of four families (validation, authentication, signer, persistence). Each family
//! carries a short, stable `message` and a `details` string taken from the
//! underlying error text; the HTTP layer maps them to status codes without ever
//! looking at the source error again.

use std::fmt;

/// Custom result type for certificate authority operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the certificate authority
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed caller input (request body, public key encoding)
    #[error("Validation error: {message}: {details}")]
    Validation { message: String, details: String },

    /// Missing, malformed, or invalid bearer credentials
    #[error("Authentication error: {kind}: {details}")]
    Auth { kind: AuthErrorKind, details: String },

    /// CA key material unavailable/unparseable, or the signing step was rejected
    #[error("Signer error: {kind}: {details}")]
    Signer { kind: SignerErrorKind, details: String },

    /// Durable storage write or read failure
    #[error("Persistence error: {context}")]
    Persistence {
        context: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Requested record does not exist
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication failure subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    MissingCredentials,
    MalformedHeader,
    InvalidToken,
}

impl AuthErrorKind {
    /// Short classification returned to the caller as `message`
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::MissingCredentials => "missing credentials",
            AuthErrorKind::MalformedHeader => "malformed credentials header",
            AuthErrorKind::InvalidToken => "invalid token",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Signer failure subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerErrorKind {
    /// The remote secrets service could not supply the CA public key
    CaKeyUnavailable,
    /// The CA public key text could not be parsed
    CaKeyMalformed,
    /// The configured CA private key could not be parsed
    PrivateKeyMalformed,
    /// Local signing operation failed
    SigningFailed,
    /// The remote signer rejected the request or could not be reached
    RemoteRejected,
}

impl SignerErrorKind {
    /// Short classification returned to the caller as `message`
    pub fn message(&self) -> &'static str {
        match self {
            SignerErrorKind::CaKeyUnavailable => "cannot fetch CA public key",
            SignerErrorKind::CaKeyMalformed => "cannot parse CA public key",
            SignerErrorKind::PrivateKeyMalformed => "cannot parse CA private key",
            SignerErrorKind::SigningFailed => "signing failed",
            SignerErrorKind::RemoteRejected => "remote signing failed",
        }
    }
}

impl fmt::Display for SignerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error {
    /// Create a validation error
    pub fn validation<M: Into<String>, D: Into<String>>(message: M, details: D) -> Self {
        Self::Validation { message: message.into(), details: details.into() }
    }

    /// Create an authentication error
    pub fn auth<D: Into<String>>(kind: AuthErrorKind, details: D) -> Self {
        Self::Auth { kind, details: details.into() }
    }

    /// Create a signer error
    pub fn signer<D: Into<String>>(kind: SignerErrorKind, details: D) -> Self {
        Self::Signer { kind, details: details.into() }
    }

    /// Create a persistence error without an underlying database error
    pub fn persistence<S: Into<String>>(context: S) -> Self {
        Self::Persistence { context: context.into(), source: None }
    }

    /// Create a persistence error wrapping a database error
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Persistence { context: context.into(), source: Some(source) }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::Auth { kind: AuthErrorKind::MalformedHeader, .. } => 400,
            Error::Auth { .. } => 401,
            Error::Signer { kind: SignerErrorKind::CaKeyUnavailable, .. } => 500,
            Error::Signer { .. } => 400,
            Error::Persistence { .. } => 400,
            Error::NotFound { .. } => 404,
            Error::Config(_) | Error::Transport(_) | Error::Io(_) | Error::Internal(_) => 500,
        }
    }

    /// Short, stable classification used as the response `message`
    pub fn message(&self) -> String {
        match self {
            Error::Validation { message, .. } => message.clone(),
            Error::Auth { kind, .. } => kind.message().to_string(),
            Error::Signer { kind, .. } => kind.message().to_string(),
            Error::Persistence { .. } => "storing certificate failed".to_string(),
            Error::NotFound { .. } => "not found".to_string(),
            Error::Config(_) => "configuration error".to_string(),
            Error::Transport(_) => "transport error".to_string(),
            Error::Io(_) | Error::Internal(_) => "internal error".to_string(),
        }
    }

    /// Diagnostic text derived from the underlying error, used as the response `details`
    pub fn details(&self) -> String {
        match self {
            Error::Validation { details, .. }
            | Error::Auth { details, .. }
            | Error::Signer { details, .. } => details.clone(),
            Error::Persistence { context, source } => match source {
                Some(source) => format!("{}: {}", context, source),
                None => context.clone(),
            },
            Error::NotFound { resource_type, id } => format!("{} '{}' not found", resource_type, id),
            Error::Config(msg) | Error::Transport(msg) | Error::Internal(msg) => msg.clone(),
            Error::Io(err) => err.to_string(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        // Nested section errors are not part of field_errors()
        let message = if message.is_empty() { errors.to_string() } else { message };

        Self::config(format!("Validation failed: {}", message))
    }
}

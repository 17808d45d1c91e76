//! Domain errors for the quorum backend.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur anywhere in the quorum system.
///
/// Provider wrappers return [`DomainError::MissingApiKey`] before issuing
/// any network call when the relevant credential is absent. HTTP and
/// decode failures map to the provider variants and propagate unchanged;
/// there is no retry layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{provider} API key not configured (set {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("{provider} request failed: {message}")]
    ProviderUnreachable {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned {status}: {body}")]
    ProviderStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} response could not be decoded: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },

    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Memory not found: {0}")]
    MemoryNotFound(String),

    #[error("Invalid task transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap a transport-level failure from `reqwest` for the given provider.
    pub fn unreachable(provider: &'static str, err: &reqwest::Error) -> Self {
        DomainError::ProviderUnreachable {
            provider,
            message: err.to_string(),
        }
    }

    /// Wrap a non-success HTTP status for the given provider.
    pub fn status(provider: &'static str, status: reqwest::StatusCode, body: String) -> Self {
        DomainError::ProviderStatus {
            provider,
            status: status.as_u16(),
            body,
        }
    }

    /// Wrap a body that did not match the documented response shape.
    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        DomainError::MalformedResponse {
            provider,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

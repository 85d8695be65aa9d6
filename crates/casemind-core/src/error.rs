//! Error types for casemind-core.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type for casemind-core operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the gateway, the stores and the query cache.
///
/// `Clone` so a failed fetch can be handed to every coalesced waiter and kept
/// in the cache entry until the next successful fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered 401. The session has already been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx response.
    #[error("Request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided `error` field, or a generic message.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Client-side validation rejected the input; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Durable session storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Whether this error came from an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// HTTP status associated with the error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

//! Error types for A2A client operations

use thiserror::Error;

/// Failure of a call made through a [`ClientTransport`](crate::ClientTransport).
///
/// Transports tag failures with one of these kinds and never retry; the
/// caller decides what to do with each kind.
#[derive(Debug, Error)]
pub enum A2AError {
    /// The request is missing routing metadata or has an unusable payload shape.
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    /// The endpoint, service or operation could not be resolved.
    #[error("Routing error: {message}")]
    Routing { message: String },

    /// The backing substrate rejected the start request.
    #[error("Invocation error: {message}")]
    Invocation { message: String },

    /// The transport does not implement this method.
    #[error("Unsupported operation: {method} is not supported by this transport")]
    UnsupportedOperation { method: &'static str },

    /// Invalid configuration or parameters
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl A2AError {
    pub fn unsupported(method: &'static str) -> Self {
        A2AError::UnsupportedOperation { method }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        A2AError::MalformedRequest {
            message: message.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, A2AError::UnsupportedOperation { .. })
    }
}

/// Convenience type alias for Results with A2AError
pub type A2AResult<T> = std::result::Result<T, A2AError>;

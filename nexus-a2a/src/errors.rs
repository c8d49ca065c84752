//! Error types for the Workflow Nexus transport.

use a2a_client::A2AError;

/// Failure reported by an operation dispatcher or the substrate behind it.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Endpoint, service or operation could not be resolved.
    #[error("Routing error: {message}")]
    Routing { message: String },

    /// The substrate refused to start the operation.
    #[error("Invocation error on {service}/{operation}: {reason}")]
    Invocation {
        service: String,
        operation: String,
        reason: String,
    },

    /// A started operation finished unsuccessfully.
    #[error("Operation {token} failed: {reason}")]
    OperationFailed { token: String, reason: String },
}

impl DispatchError {
    pub fn routing(message: impl Into<String>) -> Self {
        Self::Routing {
            message: message.into(),
        }
    }

    pub fn invocation(
        service: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invocation {
            service: service.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Keeps the error kind. The target variant supplies its own prefix.
impl From<DispatchError> for A2AError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::Routing { message } => A2AError::Routing { message },
            DispatchError::Invocation {
                service,
                operation,
                reason,
            } => A2AError::Invocation {
                message: format!("{service}/{operation}: {reason}"),
            },
            DispatchError::OperationFailed { token, reason } => A2AError::Invocation {
                message: format!("operation {token} failed: {reason}"),
            },
        }
    }
}

/// Errors raised while loading or validating a [`TransportConfig`](crate::TransportConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse {format} configuration: {reason}")]
    Parse { format: &'static str, reason: String },

    #[error("Invalid configuration: {field}: {reason}")]
    Validation { field: String, reason: String },
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Parse {
            format: "yaml",
            reason: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse {
            format: "json",
            reason: error.to_string(),
        }
    }
}

impl From<ConfigError> for A2AError {
    fn from(error: ConfigError) -> Self {
        A2AError::InvalidParameter {
            message: error.to_string(),
        }
    }
}

/// Errors from [`init_logging`](crate::logging::init_logging).
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logging is disabled")]
    Disabled,

    #[error("Global subscriber already initialized")]
    AlreadyInitialized,
}

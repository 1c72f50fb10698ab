//! Client error types.

use eventboard_core::TracingError;
use eventboard_providers::FetchError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The source could not produce a collection.
    #[error("{}", .0.user_message())]
    Fetch(#[source] FetchError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A command-line value was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A view was requested before any fetch succeeded.
    #[error("no events loaded")]
    NoEventsLoaded,

    /// Logging could not be set up.
    #[error("tracing setup failed: {0}")]
    Tracing(#[from] TracingError),
}

impl From<FetchError> for ClientError {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

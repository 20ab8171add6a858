//! Error types for the heat server.

use heat_core::WorkloadError;
use thiserror::Error;

/// Errors that can occur in the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Socket read or write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed HTTP request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workload failed.
    #[error(transparent)]
    Workload(#[from] WorkloadError),

    /// An offloaded workload task panicked or was cancelled.
    #[error("Workload task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// Whether the error was caused by the client.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServerError::BadRequest(_))
    }
}

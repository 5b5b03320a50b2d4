//! Error types for the relay runner

use thiserror::Error;

/// Errors raised while validating or running an operation
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Missing or inconsistent parameters; the client should fix its request
    #[error("{0}")]
    InvalidParameter(String),

    /// The utility ran and failed, or could not be run at all
    #[error("{0}")]
    Execution(String),

    /// Staging files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Whether the error was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}

impl From<flashweb_core::Error> for RunnerError {
    fn from(e: flashweb_core::Error) -> Self {
        match e {
            flashweb_core::Error::InvalidParameter(msg) => Self::InvalidParameter(msg),
        }
    }
}

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

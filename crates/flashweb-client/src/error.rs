//! Error types for the submission client

use thiserror::Error;

/// Transport-level failures
///
/// A response with a non-2xx status is not a transport error; it is
/// returned as a [`RawResponse`](crate::RawResponse) and classified by
/// [`submit`](crate::submit).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Relay URL could not be parsed or joined
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),

    /// The request never got a response
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Transport-specific failure (used by alternative transports)
    #[error("{0}")]
    Other(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, TransportError>;

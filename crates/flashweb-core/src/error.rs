//! Error types for flashweb-core

use thiserror::Error;

/// Errors raised while interpreting form values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value could not be mapped onto the form model
    #[error("{0}")]
    InvalidParameter(String),
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

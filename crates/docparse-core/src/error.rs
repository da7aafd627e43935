//! Error types for Docparse.

use thiserror::Error;

/// Core error type for Docparse domain operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed parsed document: {0}")]
    Conversion(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using Docparse's Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

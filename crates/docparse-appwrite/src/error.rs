//! Error types for Appwrite calls.

use thiserror::Error;

/// Errors returned by the Appwrite client.
#[derive(Error, Debug)]
pub enum AppwriteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Connection failures, timeouts and 5xx responses.
    #[error("Transient Appwrite failure: {0}")]
    Transient(String),

    #[error("Appwrite error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type AppwriteResult<T> = Result<T, AppwriteError>;

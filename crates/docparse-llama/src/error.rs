//! Error types for remote parser calls.

use thiserror::Error;

/// Errors that can occur when calling the parse API.
#[derive(Error, Debug)]
pub enum LlamaError {
    /// Unable to reach the parser.
    #[error("LlamaCloud API is unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    /// Request timeout.
    #[error("LlamaCloud API request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// API returned a non-success status.
    #[error("LlamaCloud API error: {}", status_line(*status, status_text))]
    ApiError {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Success status but the body is not JSON.
    #[error("LlamaCloud API returned a malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn status_line(status: u16, status_text: &str) -> String {
    if status_text.is_empty() {
        status.to_string()
    } else {
        format!("{} {}", status, status_text)
    }
}

/// Result type for parse API operations.
pub type LlamaResult<T> = Result<T, LlamaError>;

//! Docparse Llama - Client for the remote document parsing API.
//!
//! Uploads file bytes as a multipart form and returns the parser's raw JSON
//! response for the handler to resolve.

mod client;
mod error;

pub use client::{LlamaParseClient, UPLOAD_FIELD, UPLOAD_FILE_NAME};
pub use error::{LlamaError, LlamaResult};

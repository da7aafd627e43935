//! Docparse Appwrite - Minimal Appwrite REST client.
//!
//! Covers the two calls the handler needs: reading a stored file's contents
//! and creating a document in a database collection.

mod client;
mod error;

pub use client::AppwriteClient;
pub use error::{AppwriteError, AppwriteResult};

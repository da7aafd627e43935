//! Docparse Handler - The document parsing function.
//!
//! This crate provides:
//! - Collaborator traits for file storage, the remote parser and the document store
//! - Adapters binding those traits to Appwrite, LlamaCloud and the local SQLite store
//! - The sequential fetch, parse, convert and persist pipeline

mod collaborators;
mod error;
mod handler;

pub use collaborators::{AppwriteStorage, DocumentStore, FileStorage, RemoteParser};
pub use error::{HandlerError, HandlerResult};
pub use handler::{Handler, HandlerSettings, Invocation};

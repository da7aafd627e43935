//! Docparse Core - Core types and domain models for the document parsing function.

mod error;
mod response;
mod types;

pub use error::{Error, Result};
pub use response::{ErrorKind, HandlerResponse, SUCCESS_MESSAGE};
pub use types::*;

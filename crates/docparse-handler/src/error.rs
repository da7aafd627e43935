//! Error taxonomy for one invocation.

use docparse_core::ErrorKind;
use thiserror::Error;

/// Result type for handler operations.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Everything that can stop the pipeline. Each variant maps to one `ErrorKind`.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("File {file_id} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge { file_id: String, size: u64, limit: u64 },

    #[error("Configuration error: {0}")]
    Config(#[from] docparse_config::ConfigError),

    #[error("Failed to retrieve file {file_id}: {source:#}")]
    Storage {
        file_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0:#}")]
    RemoteParse(anyhow::Error),

    #[error("Failed to convert parsed document: {0}")]
    Conversion(String),

    #[error("Failed to store parse result: {0:#}")]
    Persistence(anyhow::Error),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::InvalidRequest(_) | HandlerError::FileTooLarge { .. } => ErrorKind::InvalidRequest,
            HandlerError::Config(_) => ErrorKind::ConfigurationMissing,
            HandlerError::Storage { .. } => ErrorKind::StorageFailure,
            HandlerError::RemoteParse(_) => ErrorKind::RemoteParseFailure,
            HandlerError::Conversion(_) => ErrorKind::ConversionFailure,
            HandlerError::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<docparse_convert::ConvertError> for HandlerError {
    fn from(err: docparse_convert::ConvertError) -> Self {
        HandlerError::Conversion(err.to_string())
    }
}

impl From<docparse_core::Error> for HandlerError {
    fn from(err: docparse_core::Error) -> Self {
        match err {
            docparse_core::Error::InvalidInput(message) => HandlerError::InvalidRequest(message),
            docparse_core::Error::Conversion(message) => HandlerError::Conversion(message),
            docparse_core::Error::Serialization(message) => HandlerError::Conversion(message),
        }
    }
}

//! The response returned to the function caller.

use serde::{Deserialize, Serialize};

/// Message returned on a fully successful invocation.
pub const SUCCESS_MESSAGE: &str = "Document parsed and stored successfully.";

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    ConfigurationMissing,
    StorageFailure,
    RemoteParseFailure,
    ConversionFailure,
    PersistenceFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ConfigurationMissing => "configuration_missing",
            ErrorKind::StorageFailure => "storage_failure",
            ErrorKind::RemoteParseFailure => "remote_parse_failure",
            ErrorKind::ConversionFailure => "conversion_failure",
            ErrorKind::PersistenceFailure => "persistence_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `{success, message}` on success, `{success, error, kind}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl HandlerResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            message: Some(SUCCESS_MESSAGE.to_string()),
            error: None,
            kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            kind: Some(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(HandlerResponse::success()).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "message": "Document parsed and stored successfully."})
        );
    }

    #[test]
    fn test_failure_shape() {
        let response = HandlerResponse::failure(ErrorKind::StorageFailure, "file not found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "file not found", "kind": "storage_failure"})
        );
    }
}

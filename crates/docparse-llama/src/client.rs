//! LlamaCloud parse HTTP client.

use crate::error::{LlamaError, LlamaResult};
use docparse_config::LlamaConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Multipart field carrying the file bytes.
pub const UPLOAD_FIELD: &str = "file";

/// File name attached to the uploaded part.
pub const UPLOAD_FILE_NAME: &str = "document";

/// Client for the remote document parsing endpoint.
#[derive(Clone)]
pub struct LlamaParseClient {
    client: Client,
    api_url: Url,
    api_key: String,
    timeout: Duration,
}

impl LlamaParseClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &LlamaConfig) -> LlamaResult<Self> {
        Self::new(&config.api_url, &config.api_key, config.timeout_seconds)
    }

    pub fn new(api_url: &str, api_key: impl Into<String>, timeout_seconds: u64) -> LlamaResult<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| LlamaError::InvalidConfig(format!("parser URL '{}': {}", api_url, e)))?;
        let timeout = Duration::from_secs(timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlamaError::Http)?;

        Ok(Self {
            client,
            api_url,
            api_key: api_key.into(),
            timeout,
        })
    }

    /// Upload a document and return the parser's JSON response.
    pub async fn parse_document(&self, bytes: Vec<u8>) -> LlamaResult<serde_json::Value> {
        debug!("Uploading {} bytes to {}", bytes.len(), self.api_url);

        let part = Part::bytes(bytes).file_name(UPLOAD_FILE_NAME);
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlamaError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    LlamaError::Unreachable {
                        url: self.api_url.to_string(),
                        message: e.to_string(),
                    }
                } else {
                    LlamaError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Parser rejected upload with status {}", status);
            return Err(LlamaError::ApiError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                LlamaError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                LlamaError::Http(e)
            }
        })?;

        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| LlamaError::MalformedResponse(e.to_string()))?;
        info!("Parser responded with {} bytes", body.len());

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlamaParseClient {
        LlamaParseClient::new(&format!("{}/api/parsing/upload", server.uri()), "llx-test", 5).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = LlamaConfig {
            api_url: "https://api.cloud.llamaindex.ai/api/parsing/upload".to_string(),
            api_key: "k".to_string(),
            timeout_seconds: 120,
        };
        assert!(LlamaParseClient::from_config(&config).is_ok());

        let bad = LlamaConfig {
            api_url: "not a url".to_string(),
            ..config
        };
        assert!(matches!(
            LlamaParseClient::from_config(&bad),
            Err(LlamaError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_sends_bearer_and_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/parsing/upload"))
            .and(header("authorization", "Bearer llx-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "# Hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let value = client_for(&server).parse_document(b"%PDF-1.4".to_vec()).await.unwrap();
        assert_eq!(value, json!({"text": "# Hi"}));

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        let content_type = requests[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));

        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains(r#"name="file""#));
        assert!(body.contains(r#"filename="document""#));
        assert!(body.contains("%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_error_status_carries_code_and_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client_for(&server).parse_document(vec![1, 2, 3]).await.unwrap_err();
        match &err {
            LlamaError::ApiError { status, body, .. } => {
                assert_eq!(*status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(err.to_string(), "LlamaCloud API error: 502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_unknown_status_has_no_reason_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(599))
            .mount(&server)
            .await;

        let err = client_for(&server).parse_document(vec![1]).await.unwrap_err();
        assert_eq!(err.to_string(), "LlamaCloud API error: 599");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).parse_document(vec![0]).await.unwrap_err();
        assert!(matches!(err, LlamaError::MalformedResponse(_)));
    }
}

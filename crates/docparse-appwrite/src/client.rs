//! Appwrite HTTP client.

use crate::error::{AppwriteError, AppwriteResult};
use docparse_config::AppwriteConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Client for the Appwrite storage and databases APIs.
#[derive(Clone)]
pub struct AppwriteClient {
    client: Client,
    endpoint: Url,
    project: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentRequest<'a> {
    document_id: &'a str,
    data: &'a serde_json::Value,
}

/// Appwrite's JSON error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl AppwriteClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &AppwriteConfig) -> AppwriteResult<Self> {
        Self::new(&config.endpoint, &config.project, &config.api_key)
    }

    pub fn new(
        endpoint: &str,
        project: impl Into<String>,
        api_key: impl Into<String>,
    ) -> AppwriteResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppwriteError::InvalidConfig(format!("endpoint '{}': {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(AppwriteError::InvalidConfig(format!(
                "endpoint '{}' cannot be used as a base URL",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(AppwriteError::Http)?;

        Ok(Self {
            client,
            endpoint,
            project: project.into(),
            api_key: api_key.into(),
        })
    }

    /// Read the raw contents of a stored file.
    pub async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> AppwriteResult<Vec<u8>> {
        let url = self.url(&["storage", "buckets", bucket_id, "files", file_id, "view"])?;
        debug!("Fetching file view from {}", url);

        let response = self.send(self.client.get(url)).await?;
        let response = check_status(response, &format!("file {}", file_id)).await?;
        let bytes = response.bytes().await.map_err(transient)?;

        info!("Fetched {} bytes for file {}", bytes.len(), file_id);
        Ok(bytes.to_vec())
    }

    /// Create a document with the given id and fields.
    pub async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &serde_json::Value,
    ) -> AppwriteResult<serde_json::Value> {
        let url = self.url(&["databases", database_id, "collections", collection_id, "documents"])?;
        debug!("Creating document {} at {}", document_id, url);

        let body = CreateDocumentRequest { document_id, data };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let response = check_status(
            response,
            &format!("collection {}/{}", database_id, collection_id),
        )
        .await?;

        let created: serde_json::Value = response.json().await.map_err(transient)?;
        info!("Created document {}", document_id);
        Ok(created)
    }

    fn url(&self, segments: &[&str]) -> AppwriteResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AppwriteError::InvalidConfig(format!("bad endpoint {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> AppwriteResult<Response> {
        request
            .header(PROJECT_HEADER, &self.project)
            .header(KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(transient)
    }
}

fn transient(err: reqwest::Error) -> AppwriteError {
    if err.is_timeout() || err.is_connect() || err.is_body() || err.is_decode() {
        AppwriteError::Transient(err.to_string())
    } else {
        AppwriteError::Http(err)
    }
}

async fn check_status(response: Response, what: &str) -> AppwriteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(match status {
        StatusCode::NOT_FOUND => AppwriteError::NotFound(format!("{}: {}", what, message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppwriteError::AccessDenied(format!("{}: {}", what, message))
        }
        StatusCode::BAD_REQUEST => AppwriteError::Validation(message),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            AppwriteError::Transient(format!("status {}: {}", s.as_u16(), message))
        }
        s => AppwriteError::Api {
            status: s.as_u16(),
            message,
        },
    })
}

//! External collaborators and their adapters.

use anyhow::Context;
use async_trait::async_trait;
use docparse_appwrite::AppwriteClient;
use docparse_core::{ParseResult, StoredRecord};
use docparse_db::Database;
use docparse_llama::LlamaParseClient;
use tracing::debug;

/// Object storage holding the uploaded files.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Read the full contents of a stored file.
    async fn get_file_contents(&self, file_id: &str) -> anyhow::Result<Vec<u8>>;
}

/// The remote document parsing service.
#[async_trait]
pub trait RemoteParser: Send + Sync {
    /// Submit file bytes and return the parser's raw JSON response.
    async fn parse(&self, bytes: Vec<u8>) -> anyhow::Result<serde_json::Value>;
}

/// Database receiving one record per successful invocation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        result: &ParseResult,
    ) -> anyhow::Result<()>;
}

/// Appwrite storage scoped to one bucket.
#[derive(Clone)]
pub struct AppwriteStorage {
    client: AppwriteClient,
    bucket_id: String,
}

impl AppwriteStorage {
    pub fn new(client: AppwriteClient, bucket_id: impl Into<String>) -> Self {
        Self {
            client,
            bucket_id: bucket_id.into(),
        }
    }
}

#[async_trait]
impl FileStorage for AppwriteStorage {
    async fn get_file_contents(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.client.get_file_view(&self.bucket_id, file_id).await?)
    }
}

#[async_trait]
impl RemoteParser for LlamaParseClient {
    async fn parse(&self, bytes: Vec<u8>) -> anyhow::Result<serde_json::Value> {
        Ok(self.parse_document(bytes).await?)
    }
}

#[async_trait]
impl DocumentStore for AppwriteClient {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        result: &ParseResult,
    ) -> anyhow::Result<()> {
        let fields = result.to_fields()?;
        AppwriteClient::create_document(self, database_id, collection_id, document_id, &fields).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        result: &ParseResult,
    ) -> anyhow::Result<()> {
        let db = self.clone();
        let record = StoredRecord::new(document_id, database_id, collection_id, result.clone());
        debug!("Writing record {} to local store", record.id);

        tokio::task::spawn_blocking(move || db.create_record(&record))
            .await
            .context("local store task failed")??;
        Ok(())
    }
}

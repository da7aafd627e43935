//! The request handler: fetch, parse, convert, persist.

use crate::collaborators::{AppwriteStorage, DocumentStore, FileStorage, RemoteParser};
use crate::error::{HandlerError, HandlerResult};
use docparse_appwrite::AppwriteClient;
use docparse_config::Config;
use docparse_core::{new_id, HandlerResponse, ParseRequest, ParseResult, ParsedDocument, RecordId};
use docparse_llama::LlamaParseClient;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Where results go and which limits apply.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub database_id: String,
    pub collection_id: String,
    pub max_file_bytes: Option<u64>,
}

impl HandlerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            database_id: config.appwrite.database_id.clone(),
            collection_id: config.appwrite.collection_id.clone(),
            max_file_bytes: config.handler.max_file_bytes,
        }
    }
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub record_id: RecordId,
    pub result: ParseResult,
}

/// The document parsing function with its collaborators.
#[derive(Clone)]
pub struct Handler {
    storage: Arc<dyn FileStorage>,
    parser: Arc<dyn RemoteParser>,
    store: Arc<dyn DocumentStore>,
    settings: HandlerSettings,
}

impl Handler {
    pub fn new(
        storage: Arc<dyn FileStorage>,
        parser: Arc<dyn RemoteParser>,
        store: Arc<dyn DocumentStore>,
        settings: HandlerSettings,
    ) -> Self {
        Self {
            storage,
            parser,
            store,
            settings,
        }
    }

    /// Build a handler talking to Appwrite and LlamaCloud.
    pub fn from_config(config: &Config) -> HandlerResult<Self> {
        config.validate()?;

        let appwrite = AppwriteClient::from_config(&config.appwrite)
            .map_err(|e| HandlerError::Config(docparse_config::ConfigError::Invalid(e.to_string())))?;
        let parser = LlamaParseClient::from_config(&config.llama)
            .map_err(|e| HandlerError::Config(docparse_config::ConfigError::Invalid(e.to_string())))?;

        let storage = AppwriteStorage::new(appwrite.clone(), &config.appwrite.bucket_id);

        Ok(Self::new(
            Arc::new(storage),
            Arc::new(parser),
            Arc::new(appwrite),
            HandlerSettings::from_config(config),
        ))
    }

    /// Replace the document store, e.g. with a local database.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = store;
        self
    }

    /// Handle a raw JSON request body. Never fails: errors become failure responses.
    pub async fn handle_json(&self, body: &[u8]) -> HandlerResponse {
        match ParseRequest::from_json(body) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                let err = HandlerError::from(e);
                error!(kind = %err.kind(), "Rejected request: {}", err);
                HandlerResponse::failure(err.kind(), err.to_string())
            }
        }
    }

    /// Handle a decoded request. Never fails: errors become failure responses.
    pub async fn handle(&self, request: &ParseRequest) -> HandlerResponse {
        match self.process(request).await {
            Ok(invocation) => {
                info!(
                    file_id = %request.file_id,
                    record_id = %invocation.record_id,
                    "Document parsed and stored"
                );
                HandlerResponse::success()
            }
            Err(err) => {
                error!(
                    file_id = %request.file_id,
                    user_id = %request.user_id,
                    kind = %err.kind(),
                    "Error parsing document: {}",
                    err
                );
                HandlerResponse::failure(err.kind(), err.to_string())
            }
        }
    }

    /// Run the pipeline, stopping at the first failing step.
    ///
    /// The only durable effect, the record write, happens after every other
    /// step has succeeded.
    #[instrument(skip(self, request), fields(file_id = %request.file_id, user_id = %request.user_id))]
    pub async fn process(&self, request: &ParseRequest) -> HandlerResult<Invocation> {
        request.validate()?;

        let bytes = self
            .storage
            .get_file_contents(&request.file_id)
            .await
            .map_err(|source| HandlerError::Storage {
                file_id: request.file_id.clone(),
                source,
            })?;
        debug!("Retrieved {} bytes", bytes.len());

        if let Some(limit) = self.settings.max_file_bytes {
            let size = bytes.len() as u64;
            if size > limit {
                return Err(HandlerError::FileTooLarge {
                    file_id: request.file_id.clone(),
                    size,
                    limit,
                });
            }
        }

        let response = self
            .parser
            .parse(bytes)
            .await
            .map_err(HandlerError::RemoteParse)?;

        let document = ParsedDocument::from_value(response)?;
        info!(
            "Parser returned {}",
            match &document {
                ParsedDocument::Tables(tables) => format!("{} tables", tables.len()),
                ParsedDocument::Text(text) => format!("{} characters of text", text.len()),
            }
        );

        let result = docparse_convert::render_output(request, &document)?;

        let record_id = new_id();
        self.store
            .create_document(
                &self.settings.database_id,
                &self.settings.collection_id,
                &record_id,
                &result,
            )
            .await
            .map_err(HandlerError::Persistence)?;

        Ok(Invocation { record_id, result })
    }
}

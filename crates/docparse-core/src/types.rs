//! Core domain types for Docparse.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Identifier of a file in object storage.
pub type FileId = String;

/// Identifier of the user who owns a parse.
pub type UserId = String;

/// Identifier of a persisted result record.
pub type RecordId = String;

/// A single table row: column name to cell value, in column order.
pub type Row = Map<String, Value>;

/// A table as returned by the parser: an ordered list of rows.
pub type Table = Vec<Row>;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Incoming request: which stored file to parse, and for whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub file_id: FileId,
    pub user_id: UserId,
}

impl ParseRequest {
    pub fn new(file_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Decode a request from a raw JSON body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::InvalidInput(format!("request body is not a valid parse request: {}", e)))
    }

    /// Both identifiers must be present and non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.file_id.trim().is_empty() {
            return Err(Error::InvalidInput("fileId is required".to_string()));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::InvalidInput("userId is required".to_string()));
        }
        Ok(())
    }
}

/// Output of the remote parser, resolved to exactly one representation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDocument {
    /// One or more tables; rendered as a workbook.
    Tables(Vec<Table>),
    /// Plain text; rendered as Markdown.
    Text(String),
}

impl ParsedDocument {
    /// Resolve a raw parser response into a single variant.
    ///
    /// A non-empty `tables` array always wins over `text`. A response with
    /// neither usable tables nor a `text` string is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::Conversion(format!(
                    "parser response is not a JSON object (got {})",
                    json_kind(&other)
                )))
            }
        };

        match object.remove("tables") {
            None | Some(Value::Null) => {}
            Some(Value::Array(tables)) if !tables.is_empty() => {
                return Ok(ParsedDocument::Tables(parse_tables(tables)?));
            }
            Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(Error::Conversion(format!(
                    "`tables` must be an array (got {})",
                    json_kind(&other)
                )))
            }
        }

        match object.remove("text") {
            Some(Value::String(text)) => Ok(ParsedDocument::Text(text)),
            None | Some(Value::Null) => Err(Error::Conversion(
                "parser response contains neither tables nor text".to_string(),
            )),
            Some(other) => Err(Error::Conversion(format!(
                "`text` must be a string (got {})",
                json_kind(&other)
            ))),
        }
    }
}

fn parse_tables(tables: Vec<Value>) -> Result<Vec<Table>> {
    tables
        .into_iter()
        .enumerate()
        .map(|(t, table)| {
            let rows = match table {
                Value::Array(rows) => rows,
                other => {
                    return Err(Error::Conversion(format!(
                        "table {} is not an array of rows (got {})",
                        t + 1,
                        json_kind(&other)
                    )))
                }
            };

            rows.into_iter()
                .enumerate()
                .map(|(r, row)| match row {
                    Value::Object(row) => Ok(row),
                    other => Err(Error::Conversion(format!(
                        "row {} of table {} is not an object (got {})",
                        r + 1,
                        t + 1,
                        json_kind(&other)
                    ))),
                })
                .collect()
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The record written to the database for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub user_id: UserId,
    pub document_id: FileId,
    pub markdown_output: String,
    /// Base64-encoded XLSX workbook, present only for tabular output.
    pub xlsx_output: Option<String>,
}

impl ParseResult {
    pub fn markdown(request: &ParseRequest, html: impl Into<String>) -> Self {
        Self {
            user_id: request.user_id.clone(),
            document_id: request.file_id.clone(),
            markdown_output: html.into(),
            xlsx_output: None,
        }
    }

    pub fn workbook(request: &ParseRequest, xlsx_base64: impl Into<String>) -> Self {
        Self {
            user_id: request.user_id.clone(),
            document_id: request.file_id.clone(),
            markdown_output: String::new(),
            xlsx_output: Some(xlsx_base64.into()),
        }
    }

    /// Serialize as the field map sent to a document store.
    pub fn to_fields(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A persisted parse result with its storage coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub database_id: String,
    pub collection_id: String,
    pub created_at: DateTime<Utc>,
    pub result: ParseResult,
}

impl StoredRecord {
    pub fn new(
        id: impl Into<String>,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
        result: ParseResult,
    ) -> Self {
        Self {
            id: id.into(),
            database_id: database_id.into(),
            collection_id: collection_id.into(),
            created_at: Utc::now(),
            result,
        }
    }
}

//! Docparse Convert - Turn a parsed document into storable output.
//!
//! Tabular documents become a base64-encoded XLSX workbook with one sheet per
//! table; text documents are rendered from Markdown to HTML.

mod error;
mod markdown;
mod workbook;

pub use error::{ConvertError, ConvertResult};
pub use markdown::render_markdown;
pub use workbook::{build_workbook, encode_workbook, sheet_name, table_columns};

use docparse_core::{ParseRequest, ParseResult, ParsedDocument};
use tracing::debug;

/// Render a parsed document into the record persisted for `request`.
pub fn render_output(request: &ParseRequest, document: &ParsedDocument) -> ConvertResult<ParseResult> {
    match document {
        ParsedDocument::Tables(tables) => {
            let encoded = encode_workbook(tables)?;
            debug!("Encoded {} tables into {} base64 bytes", tables.len(), encoded.len());
            Ok(ParseResult::workbook(request, encoded))
        }
        ParsedDocument::Text(text) => {
            let html = render_markdown(text);
            debug!("Rendered {} bytes of markdown into {} bytes of HTML", text.len(), html.len());
            Ok(ParseResult::markdown(request, html))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ParsedDocument {
        ParsedDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_text_branch() {
        let request = ParseRequest::new("f1", "u1");
        let result = render_output(&request, &document(json!({"text": "# Hi"}))).unwrap();

        assert_eq!(result.markdown_output, "<h1>Hi</h1>\n");
        assert!(result.xlsx_output.is_none());
        assert_eq!(result.document_id, "f1");
        assert_eq!(result.user_id, "u1");
    }

    #[test]
    fn test_tables_branch() {
        let request = ParseRequest::new("f1", "u1");
        let doc = document(json!({"text": "# Hi", "tables": [[{"A": "1", "B": "2"}]]}));
        let result = render_output(&request, &doc).unwrap();

        assert_eq!(result.markdown_output, "");
        assert!(result.xlsx_output.is_some());
    }
}

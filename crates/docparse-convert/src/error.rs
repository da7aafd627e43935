//! Error types for output conversion.

use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while building output.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("Table {table} has {columns} columns, more than a worksheet can hold")]
    TooManyColumns { table: usize, columns: usize },

    #[error("Table {table} has {rows} rows, more than a worksheet can hold")]
    TooManyRows { table: usize, rows: usize },
}

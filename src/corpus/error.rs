// Loader errors.
//
// Only a missing column or an unreadable file aborts a load. Row-level
// problems are collected in LoadDiagnostics and the row is skipped.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A required column is absent from a table header.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{table} table is missing required column `{column}`")]
pub struct SchemaError {
    pub table: String,
    pub column: String,
}

/// A field could not be decoded as UTF-8. The row is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{table} row {row}: column `{column}` is not valid UTF-8")]
pub struct EncodingError {
    pub table: String,
    /// 1-based data row (header excluded)
    pub row: usize,
    pub column: String,
}

/// A row the CSV reader could not parse at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub table: String,
    pub row: usize,
    pub message: String,
}

/// Fatal load failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to open {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {table} table")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
}

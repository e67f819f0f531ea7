//! Workbook errors.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for workbook operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Errors reading or writing spreadsheets.
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no worksheets")]
    NoWorksheet { path: PathBuf },

    #[error("{table} table is missing required column '{column}'")]
    SchemaMismatch {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} table, row {row}, column '{column}': {reason}")]
    InvalidCell {
        table: &'static str,
        row: usize,
        column: &'static str,
        reason: String,
    },

    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

impl WorkbookError {
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            WorkbookError::SchemaMismatch { .. } | WorkbookError::InvalidCell { .. }
        )
    }
}

//! Error types for tagsheet core.

use thiserror::Error;

/// Errors that can occur while editing or storing sheets
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Row not found: {0}")]
    RowNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid column type: {0}")]
    InvalidColumnType(String),

    #[error("Index {index} out of range for {len} columns")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Column is not an enum column: {0}")]
    NotAnEnumColumn(String),

    #[error("Column is not a tags column: {0}")]
    NotATagsColumn(String),

    #[error("Column is not a formula column: {0}")]
    NotAFormulaColumn(String),

    #[error("Row already exists: {0}")]
    DuplicateRowId(String),

    #[error("Column already exists: {0}")]
    DuplicateColumnId(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Write queue is closed")]
    QueueClosed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

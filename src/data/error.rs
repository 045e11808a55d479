use std::path::PathBuf;

use thiserror::Error;

use super::model::Field;

/// Structural problems found while reading a campaign file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("missing column '{0}'")]
    MissingColumn(Field),

    #[error("row {row}: column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: Field,
        value: String,
    },

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("{0}")]
    Malformed(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

impl LoadError {
    /// Whether the error concerns a single row (and may be skipped).
    pub fn is_row_level(&self) -> bool {
        matches!(self, LoadError::InvalidValue { .. } | LoadError::InvalidRow { .. })
    }
}

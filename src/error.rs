//! Error types for the Titanic EDA pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EdaError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum EdaError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Plot error: {0}")]
    PlotError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for EdaError {
    fn from(err: polars::error::PolarsError) -> Self {
        EdaError::DataError(err.to_string())
    }
}

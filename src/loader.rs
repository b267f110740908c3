//! CSV loading and saving

use crate::error::{EdaError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for the delimited passenger dataset
pub struct DataLoader {
    /// Number of rows used for schema inference
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(100),
        }
    }

    /// Load a comma-delimited file with a header row.
    ///
    /// Column types are inferred per column; missing cells become nulls.
    /// A path that does not resolve, or rows with a ragged column count
    /// relative to the header, surface as [`EdaError::DataError`].
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| EdaError::DataError(format!("{}: {e}", path.display())))?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| EdaError::DataError(format!("{}: {e}", path.display())))
    }
}

/// Saver for the cleaned table
pub struct DataSaver;

impl DataSaver {
    /// Save a DataFrame as a comma-delimited file with a header row.
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .map_err(|e| EdaError::DataError(format!("{}: {e}", path.display())))?;

        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| EdaError::DataError(format!("{}: {e}", path.display())))
    }
}

//! Record source trait and common types
//!
//! The `RecordSource` trait provides a uniform interface for loading
//! place records from the supported input formats.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use implace_core::{ImplaceError, LoadReport, Loader, PlaceRecord};
use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error(transparent)]
    Core(#[from] ImplaceError),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err.to_string())
    }
}

impl From<csv::Error> for IoError {
    fn from(err: csv::Error) -> Self {
        IoError::InvalidFormat(err.to_string())
    }
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;

/// Records loaded from one input together with the load counts
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<PlaceRecord>,
    pub report: LoadReport,
}

/// Trait for reading place records from an input file
///
/// Implementations validate every row through the [`Loader`] and skip bad
/// rows instead of failing; only an unreadable file or a structurally
/// invalid document is an error.
pub trait RecordSource {
    /// Read all records, admitting ids not yet in `seen_ids`
    fn read_records(
        &self,
        loader: &Loader,
        seen_ids: &mut HashSet<String>,
    ) -> IoResult<LoadedRecords>;

    /// Get the file path
    fn path(&self) -> &Path;

    /// Get the format name
    fn format_name(&self) -> &'static str;
}

/// A boxed source for dynamic dispatch
pub type BoxedSource = Box<dyn RecordSource>;

/// Open a file and return an appropriate source
///
/// The format is auto-detected from the file extension.
pub fn open_source(path: impl Into<PathBuf>) -> IoResult<BoxedSource> {
    let path = path.into();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" | "txt" => {
            use crate::raw_reader::RawJsonReader;
            Ok(Box::new(RawJsonReader::open(path)?))
        }

        "csv" => {
            use crate::csv_reader::CanonicalCsvReader;
            Ok(Box::new(CanonicalCsvReader::open(path)?))
        }

        _ => Err(IoError::InvalidFormat(format!(
            "Unknown file extension: {}",
            extension
        ))),
    }
}

/// List supported file extensions
pub fn supported_extensions() -> Vec<&'static str> {
    vec!["json", "txt", "csv"]
}

/// Fail with `FileNotFound` unless `path` is an existing file
pub(crate) fn ensure_file(path: &Path) -> IoResult<()> {
    if !path.is_file() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        let extensions = supported_extensions();
        assert!(extensions.contains(&"csv"));
        assert!(extensions.contains(&"json"));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            open_source("places.parquet"),
            Err(IoError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            open_source("/nonexistent/places.json"),
            Err(IoError::FileNotFound(_))
        ));
    }
}

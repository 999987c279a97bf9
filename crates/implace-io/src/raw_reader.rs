//! Reader for raw discovered-place documents
//!
//! A raw document is the JSON array accumulated by the radius searches.
//! Files with a `.txt` extension are accepted too, since the collection
//! step has historically written its dumps that way.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use implace_core::loader::parse_collection;
use implace_core::Loader;

use crate::reader::{ensure_file, IoError, IoResult, LoadedRecords, RecordSource};

/// Raw JSON document reader
pub struct RawJsonReader {
    path: PathBuf,
}

impl RawJsonReader {
    /// Open a raw document
    pub fn open(path: impl Into<PathBuf>) -> IoResult<Self> {
        let path = path.into();
        ensure_file(&path)?;
        Ok(Self { path })
    }
}

impl RecordSource for RawJsonReader {
    fn read_records(
        &self,
        loader: &Loader,
        seen_ids: &mut HashSet<String>,
    ) -> IoResult<LoadedRecords> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            IoError::OpenFailed(format!("{}: {}", self.path.display(), e))
        })?;
        let entries = parse_collection(&text)?;
        tracing::debug!("Read {} raw entries from {}", entries.len(), self.path.display());

        let (records, report) = loader.load(&entries, seen_ids);
        Ok(LoadedRecords { records, report })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn format_name(&self) -> &'static str {
        "raw JSON"
    }
}

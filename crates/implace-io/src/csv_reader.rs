//! Reader for canonical place tables
//!
//! Re-ingests a table previously written by this pipeline (or edited by
//! hand) so the filters can be run again over it. Audit tables are accepted
//! too: their `# MARKER` rows are ignored.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use implace_core::{LoadReport, Loader, PlaceRecord, RemovalReason, SkipReason};

use crate::reader::{ensure_file, IoError, IoResult, LoadedRecords, RecordSource};
use crate::schema::{Column, ColumnMap};

/// Canonical CSV table reader
pub struct CanonicalCsvReader {
    path: PathBuf,
    delimiter: u8,
}

impl CanonicalCsvReader {
    /// Open a comma-delimited canonical table
    pub fn open(path: impl Into<PathBuf>) -> IoResult<Self> {
        Self::open_with_delimiter(path, b',')
    }

    /// Open a canonical table with a custom delimiter
    pub fn open_with_delimiter(path: impl Into<PathBuf>, delimiter: u8) -> IoResult<Self> {
        let path = path.into();
        ensure_file(&path)?;
        Ok(Self { path, delimiter })
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        columns: &ColumnMap,
        precision: u32,
    ) -> Result<PlaceRecord, SkipReason> {
        let field = |column: Column| {
            row.get(columns.index(column))
                .map(str::trim)
                .ok_or(SkipReason::Malformed)
        };

        let id = field(Column::PlaceId)?;
        if id.is_empty() {
            return Err(SkipReason::MissingId);
        }

        let latitude = parse_coordinate(field(Column::Latitude)?, 90.0)?;
        let longitude = parse_coordinate(field(Column::Longitude)?, 180.0)?;
        let rating_count = parse_rating(field(Column::Ratings)?)?;

        Ok(PlaceRecord::from_table(
            id,
            field(Column::Name)?,
            field(Column::Type)?,
            rating_count,
            latitude,
            longitude,
            precision,
        ))
    }
}

impl RecordSource for CanonicalCsvReader {
    fn read_records(
        &self,
        loader: &Loader,
        seen_ids: &mut HashSet<String>,
    ) -> IoResult<LoadedRecords> {
        let file = File::open(&self.path)
            .map_err(|e| IoError::OpenFailed(format!("{}: {}", self.path.display(), e)))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let columns = ColumnMap::from_headers(reader.headers()?.iter())?;

        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (index, result) in reader.records().enumerate() {
            let row = result?;
            if is_section_marker(&row) {
                continue;
            }
            report.entries_seen += 1;

            match self.parse_row(&row, &columns, loader.precision()) {
                Ok(record) => {
                    if let Err(reason) = loader.admit(record, seen_ids, &mut records, &mut report)
                    {
                        tracing::debug!(row = index + 1, %reason, "skipping row");
                    }
                }
                Err(reason) => {
                    tracing::debug!(row = index + 1, %reason, "skipping row");
                    report.record_skip(reason);
                }
            }
        }

        tracing::info!(
            "Loaded {} of {} rows from {} ({} skipped)",
            report.loaded,
            report.entries_seen,
            self.path.display(),
            report.skipped_total()
        );

        Ok(LoadedRecords { records, report })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn format_name(&self) -> &'static str {
        "canonical CSV"
    }
}

fn is_section_marker(row: &csv::StringRecord) -> bool {
    match row.get(0) {
        Some(first) => {
            first.trim_start().starts_with('#')
                && (RemovalReason::from_marker(first).is_some()
                    || row.iter().skip(1).all(|f| f.trim().is_empty()))
        }
        None => false,
    }
}

fn parse_coordinate(field: &str, bound: f64) -> Result<f64, SkipReason> {
    if field.is_empty() {
        return Err(SkipReason::MissingCoordinate);
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= bound => Ok(v),
        _ => Err(SkipReason::InvalidCoordinate),
    }
}

/// Empty means no ratings; `12.0` is accepted for tables that went through a
/// spreadsheet
fn parse_rating(field: &str) -> Result<u32, SkipReason> {
    if field.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = field.parse::<u32>() {
        return Ok(n);
    }
    match field.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(SkipReason::InvalidRating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(""), Ok(0));
        assert_eq!(parse_rating("17"), Ok(17));
        assert_eq!(parse_rating("17.0"), Ok(17));
        assert_eq!(parse_rating("-1"), Err(SkipReason::InvalidRating));
        assert_eq!(parse_rating("1.5"), Err(SkipReason::InvalidRating));
        assert_eq!(parse_rating("many"), Err(SkipReason::InvalidRating));
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("-24.7859123", 90.0), Ok(-24.7859123));
        assert_eq!(parse_coordinate("", 90.0), Err(SkipReason::MissingCoordinate));
        assert_eq!(parse_coordinate("91", 90.0), Err(SkipReason::InvalidCoordinate));
        assert_eq!(parse_coordinate("NaN", 90.0), Err(SkipReason::InvalidCoordinate));
    }

    #[test]
    fn test_section_marker_rows() {
        assert!(is_section_marker(&csv::StringRecord::from(vec!["# COORD_DUPLICATE"])));
        assert!(is_section_marker(&csv::StringRecord::from(vec![
            "# PROXIMITY_DUPLICATE",
            "",
        ])));
        assert!(!is_section_marker(&csv::StringRecord::from(vec![
            "#1 Barberia",
            "barber",
            "3",
            "1.0",
            "1.0",
            "id",
        ])));
    }
}

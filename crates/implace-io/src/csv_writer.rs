//! Table serialization
//!
//! Every writer here renders into memory; [`crate::Publication`] decides
//! when the bytes reach the file system.

use implace_core::stats::TypeCount;
use implace_core::{AuditLog, PlaceRecord};
use serde::Serialize;

use crate::reader::{IoError, IoResult};
use crate::schema::{CANONICAL_HEADER, TYPE_COUNT_HEADER};

/// One canonical table row, in header order
#[derive(Debug, Serialize)]
struct CanonicalRow<'a> {
    name: &'a str,
    type_tag: &'a str,
    ratings: u32,
    latitude: &'a str,
    longitude: &'a str,
    place_id: &'a str,
}

impl<'a> From<&'a PlaceRecord> for CanonicalRow<'a> {
    fn from(record: &'a PlaceRecord) -> Self {
        let (latitude, longitude) = record.coordinate_text();
        Self {
            name: record.name(),
            type_tag: record.type_tag(),
            ratings: record.rating_count(),
            latitude,
            longitude,
            place_id: record.id(),
        }
    }
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> IoResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| IoError::Io(e.to_string()))
}

/// Render records as a canonical table
///
/// The header row is written even when there are no records.
pub fn canonical_table(records: &[PlaceRecord]) -> IoResult<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(CANONICAL_HEADER)?;
    for record in records {
        wtr.serialize(CanonicalRow::from(record))?;
    }
    finish(wtr)
}

/// Render the audit log
///
/// Canonical header, then per section a single-field `# MARKER` row followed
/// by the section's records in removal order.
pub fn audit_table(audit: &AuditLog) -> IoResult<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(CANONICAL_HEADER)?;
    for section in audit.sections() {
        wtr.write_record([section.reason.header()])?;
        for record in &section.records {
            wtr.serialize(CanonicalRow::from(record))?;
        }
    }
    finish(wtr)
}

/// Render a `type,count` table
pub fn type_count_table(counts: &[TypeCount]) -> IoResult<Vec<u8>> {
    let mut wtr = writer();
    wtr.write_record(TYPE_COUNT_HEADER)?;
    for count in counts {
        wtr.serialize(count)?;
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use implace_core::stats::count_types;
    use implace_core::RemovalReason;

    fn place(id: &str, name: &str, type_tag: &str, ratings: u32) -> PlaceRecord {
        PlaceRecord::new(id, name, type_tag, ratings, -24.78591239, -65.41166781, 7)
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_empty_canonical_table_has_header() {
        let out = text(canonical_table(&[]).unwrap());
        assert_eq!(out, "Name,type,ratings,latitude,longitude,place_id\n");
    }

    #[test]
    fn test_canonical_row_layout() {
        let out = text(canonical_table(&[place("id1", "Cafe, Sol", "cafe+bar", 12)]).unwrap());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[1], "Cafe; Sol,cafe+bar,12,-24.7859123,-65.4116678,id1");
    }

    #[test]
    fn test_coordinates_written_at_fixed_precision() {
        let record = PlaceRecord::new("w", "Plaza", "park", 0, 10.0, -65.4, 7);
        let out = text(canonical_table(&[record]).unwrap());
        assert_eq!(out.lines().nth(1), Some("Plaza,park,0,10.0000000,-65.4000000,w"));
    }

    #[test]
    fn test_audit_sections() {
        let mut audit = AuditLog::new();
        audit.open_section(RemovalReason::CoordDuplicate);
        audit.record(RemovalReason::CoordDuplicate, place("a", "A", "", 0));
        audit.open_section(RemovalReason::ProximityDuplicate);

        let out = text(audit_table(&audit).unwrap());
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Name,type,ratings,latitude,longitude,place_id",
                "# COORD_DUPLICATE",
                "A,,0,-24.7859123,-65.4116678,a",
                "# PROXIMITY_DUPLICATE",
            ]
        );
    }

    #[test]
    fn test_type_count_table() {
        let records = vec![
            place("a", "A", "cafe", 1),
            place("b", "B", "bar", 1),
            place("c", "C", "cafe", 1),
            place("d", "D", "", 1),
        ];
        let out = text(type_count_table(&count_types(&records)).unwrap());
        assert_eq!(out, "type,count\ncafe,2\nbar,1\n");
    }
}

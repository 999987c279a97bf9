//! Canonical table layout

use crate::reader::{IoError, IoResult};

/// Columns of the canonical and audit tables, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Type,
    Ratings,
    Latitude,
    Longitude,
    PlaceId,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::Type,
        Column::Ratings,
        Column::Latitude,
        Column::Longitude,
        Column::PlaceId,
    ];

    /// Header text as written to the table
    pub fn header(&self) -> &'static str {
        match self {
            Column::Name => "Name",
            Column::Type => "type",
            Column::Ratings => "ratings",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::PlaceId => "place_id",
        }
    }
}

/// Header row of the canonical table
pub const CANONICAL_HEADER: [&str; 6] = ["Name", "type", "ratings", "latitude", "longitude", "place_id"];

/// Header row of the type count table
pub const TYPE_COUNT_HEADER: [&str; 2] = ["type", "count"];

/// Position of every canonical column in a table's header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; 6],
}

impl ColumnMap {
    /// Locate every canonical column in `headers`
    ///
    /// Matching ignores case and surrounding whitespace. A missing column is
    /// an error.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> IoResult<Self> {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let mut indices = [0; 6];
        for (slot, column) in indices.iter_mut().zip(Column::ALL) {
            *slot = headers
                .iter()
                .position(|h| *h == column.header().to_lowercase())
                .ok_or_else(|| IoError::ColumnNotFound(column.header().to_string()))?;
        }
        Ok(Self { indices })
    }

    /// Get column index
    pub fn index(&self, column: Column) -> usize {
        self.indices[column as usize]
    }
}

//! Canonical place record

use serde::Serialize;

/// A validated point of interest
///
/// Built once from a raw entry and never mutated afterwards. Coordinates are
/// truncated to a fixed number of decimals on construction, and the
/// coordinate key is derived from the truncated values, so two records with
/// the same key always report the same latitude and longitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceRecord {
    id: String,
    name: String,
    type_tag: String,
    rating_count: u32,
    latitude: f64,
    longitude: f64,
    coordinate_key: String,
}

impl PlaceRecord {
    /// Build a record, truncating coordinates to `precision` decimal digits
    ///
    /// Commas in the name are replaced with semicolons so the name can sit
    /// in a comma-delimited table without quoting.
    pub fn new(
        id: impl Into<String>,
        name: &str,
        type_tag: impl Into<String>,
        rating_count: u32,
        latitude: f64,
        longitude: f64,
        precision: u32,
    ) -> Self {
        Self::build(
            id.into(),
            name,
            type_tag.into(),
            rating_count,
            truncate_coordinate(latitude, precision),
            truncate_coordinate(longitude, precision),
            precision,
        )
    }

    /// Build a record from coordinates read back from a written table
    ///
    /// Written coordinates already sit on the `precision` grid but may parse
    /// to a float just below it, so they go through [`regrid_coordinate`]
    /// instead of plain truncation.
    pub fn from_table(
        id: impl Into<String>,
        name: &str,
        type_tag: impl Into<String>,
        rating_count: u32,
        latitude: f64,
        longitude: f64,
        precision: u32,
    ) -> Self {
        Self::build(
            id.into(),
            name,
            type_tag.into(),
            rating_count,
            regrid_coordinate(latitude, precision),
            regrid_coordinate(longitude, precision),
            precision,
        )
    }

    fn build(
        id: String,
        name: &str,
        type_tag: String,
        rating_count: u32,
        latitude: f64,
        longitude: f64,
        precision: u32,
    ) -> Self {
        let p = precision as usize;
        Self {
            id,
            name: name.replace(',', ";"),
            type_tag,
            rating_count,
            latitude,
            longitude,
            coordinate_key: format!("{latitude:.p$},{longitude:.p$}"),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty, one category token, or two tokens joined by `+`
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn has_type(&self) -> bool {
        !self.type_tag.is_empty()
    }

    pub fn rating_count(&self) -> u32 {
        self.rating_count
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `"{latitude},{longitude}"` of the truncated coordinates
    pub fn coordinate_key(&self) -> &str {
        &self.coordinate_key
    }

    /// Latitude and longitude as fixed-precision text, as in the key
    pub fn coordinate_text(&self) -> (&str, &str) {
        self.coordinate_key
            .split_once(',')
            .unwrap_or((self.coordinate_key.as_str(), ""))
    }
}

/// Truncate (not round) a coordinate to `precision` decimal digits
pub fn truncate_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    // + 0.0 folds -0.0 into 0.0 so both land in the same bin
    (value * factor).trunc() / factor + 0.0
}

/// Put an already-truncated coordinate back on the `precision` grid
///
/// A value within float error of a grid line (1e-6 of a grid step) is
/// snapped to it; anything else is truncated. Only meant for values that were
/// truncated before, such as coordinates parsed from a written table; raw
/// coordinates use [`truncate_coordinate`].
pub fn regrid_coordinate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-6 {
        nearest / factor + 0.0
    } else {
        truncate_coordinate(value, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_not_round() {
        assert_eq!(truncate_coordinate(10.123456789, 7), 10.1234567);
        assert_eq!(truncate_coordinate(-24.78591239, 7), -24.7859123);
        assert_eq!(truncate_coordinate(1.99, 0), 1.0);
        assert_eq!(truncate_coordinate(-1.99, 0), -1.0);
    }

    #[test]
    fn test_truncate_never_rounds_up() {
        // Just below a grid line stays below it
        assert_eq!(truncate_coordinate(10.12345669999999, 7), 10.1234566);
        assert_eq!(truncate_coordinate(-10.12345669999999, 7), -10.1234566);
    }

    #[test]
    fn test_regrid_is_stable_for_written_values() {
        for value in [-24.7859123, -65.4116678, 10.1234567, 0.0000001, -0.3, 10.0] {
            let once = truncate_coordinate(value, 7);
            let written = format!("{once:.7}");
            let reparsed: f64 = written.parse().unwrap();
            assert_eq!(regrid_coordinate(reparsed, 7), once, "{written}");
        }
        // Finer than the grid is still truncated
        assert_eq!(regrid_coordinate(10.12345678, 7), 10.1234567);
    }

    #[test]
    fn test_from_table_matches_new() {
        let fresh = PlaceRecord::new("a", "A", "bar", 3, -24.78591239, -65.41166781, 7);
        let reread =
            PlaceRecord::from_table("a", "A", "bar", 3, -24.7859123, -65.4116678, 7);
        assert_eq!(fresh, reread);
    }

    #[test]
    fn test_negative_zero_shares_bin() {
        let a = PlaceRecord::new("a", "A", "", 0, -0.00000001, 0.0, 7);
        let b = PlaceRecord::new("b", "B", "", 0, 0.00000001, 0.0, 7);
        assert_eq!(a.coordinate_key(), b.coordinate_key());
    }

    #[test]
    fn test_coordinate_key_from_truncated_values() {
        let a = PlaceRecord::new("a", "A", "", 0, 10.00000001, 10.00000009, 7);
        let b = PlaceRecord::new("b", "B", "", 0, 10.0, 10.0, 7);
        assert_eq!(a.coordinate_key(), "10.0000000,10.0000000");
        assert_eq!(a.coordinate_key(), b.coordinate_key());
    }

    #[test]
    fn test_coordinate_text_keeps_precision() {
        let record = PlaceRecord::new("a", "A", "", 0, 10.0, -65.41, 7);
        assert_eq!(record.coordinate_text(), ("10.0000000", "-65.4100000"));
    }

    #[test]
    fn test_name_commas_replaced() {
        let record = PlaceRecord::new("a", "Bar, Grill, and Co", "bar", 2, 0.0, 0.0, 7);
        assert_eq!(record.name(), "Bar; Grill; and Co");
    }

    #[test]
    fn test_has_type() {
        assert!(!PlaceRecord::new("a", "A", "", 0, 0.0, 0.0, 7).has_type());
        assert!(PlaceRecord::new("a", "A", "cafe", 0, 0.0, 0.0, 7).has_type());
    }
}

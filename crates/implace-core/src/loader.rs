//! Raw entry validation
//!
//! Turns discovered-place entries, as returned by a nearby-search API, into
//! [`PlaceRecord`]s. A bad entry never fails the run: it is skipped and
//! counted in the [`LoadReport`] under its [`SkipReason`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::config::LoaderConfig;
use crate::error::{ImplaceError, Result};
use crate::record::PlaceRecord;

/// Generic or administrative category tokens that never name a venue type
pub const IGNORED_TYPES: &[&str] = &[
    "store",
    "administrative_area_level_1",
    "administrative_area_level_2",
    "administrative_area_level_3",
    "administrative_area_level_4",
    "administrative_area_level_5",
    "archipelago",
    "colloquial_area",
    "continent",
    "country",
    "establishment",
    "finance",
    "floor",
    "food",
    "general_contractor",
    "geocode",
    "health",
    "intersection",
    "locality",
    "natural_feature",
    "neighborhood",
    "place_of_worship",
    "point_of_interest",
    "political",
    "post_box",
    "postal_code",
    "postal_code_prefix",
    "postal_code_suffix",
    "postal_town",
    "premise",
    "room",
    "route",
    "street_address",
    "street_number",
    "sublocality",
    "sublocality_level_1",
    "sublocality_level_2",
    "sublocality_level_3",
    "sublocality_level_4",
    "sublocality_level_5",
    "subpremise",
    "town_square",
];

/// A discovered-place entry in the shape the search API returns it
///
/// Every field is optional at this level so that a single incomplete entry
/// is reported as a skip instead of failing the whole collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub user_ratings_total: Option<Value>,
    pub geometry: Option<RawGeometry>,
    /// Present only for operating businesses
    pub business_status: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeometry {
    pub location: Option<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocation {
    pub lat: Option<Value>,
    pub lng: Option<Value>,
}

/// Why an entry did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// No business-status marker
    NotOperating,
    MissingId,
    MissingCoordinate,
    /// Coordinate is not a finite number within lat/lng bounds
    InvalidCoordinate,
    /// Rating count is not a non-negative integer
    InvalidRating,
    /// Id already admitted earlier in this run
    DuplicateId,
    /// Entry does not have the expected shape at all
    Malformed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotOperating => "not_operating",
            SkipReason::MissingId => "missing_id",
            SkipReason::MissingCoordinate => "missing_coordinate",
            SkipReason::InvalidCoordinate => "invalid_coordinate",
            SkipReason::InvalidRating => "invalid_rating",
            SkipReason::DuplicateId => "duplicate_id",
            SkipReason::Malformed => "malformed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of admitted and skipped entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub entries_seen: usize,
    pub loaded: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl LoadReport {
    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: &LoadReport) {
        self.entries_seen += other.entries_seen;
        self.loaded += other.loaded;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_insert(0) += count;
        }
    }
}

/// Parse a raw JSON document into its list of entries
///
/// The document must be a JSON array; anything else is a fatal input error.
pub fn parse_collection(input: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(input)? {
        Value::Array(entries) => Ok(entries),
        other => Err(ImplaceError::MalformedInput(format!(
            "expected a JSON array of places, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validates raw entries into records
#[derive(Debug, Clone)]
pub struct Loader {
    ignored_types: HashSet<String>,
    precision: u32,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(&LoaderConfig::default())
    }
}

impl Loader {
    pub fn new(config: &LoaderConfig) -> Self {
        let ignored_types = IGNORED_TYPES
            .iter()
            .map(|t| t.to_string())
            .chain(config.extra_ignored_types.iter().cloned())
            .collect();

        Self {
            ignored_types,
            precision: config.coordinate_precision,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Load every entry in order
    ///
    /// `seen_ids` scopes id uniqueness to the caller's run: an entry whose id
    /// is already in the set is skipped, and admitted ids are added to it.
    pub fn load(
        &self,
        entries: &[Value],
        seen_ids: &mut HashSet<String>,
    ) -> (Vec<PlaceRecord>, LoadReport) {
        let mut records = Vec::with_capacity(entries.len());
        let mut report = LoadReport::default();

        for (index, entry) in entries.iter().enumerate() {
            report.entries_seen += 1;

            let outcome = RawPlace::deserialize(entry)
                .map_err(|_| SkipReason::Malformed)
                .and_then(|raw| self.load_entry(&raw));

            match outcome {
                Ok(record) => {
                    if let Err(reason) = self.admit(record, seen_ids, &mut records, &mut report)
                    {
                        tracing::debug!(index, %reason, "skipping entry");
                    }
                }
                Err(reason) => {
                    tracing::debug!(index, %reason, "skipping entry");
                    report.record_skip(reason);
                }
            }
        }

        tracing::info!(
            "Loaded {} of {} entries ({} skipped)",
            report.loaded,
            report.entries_seen,
            report.skipped_total()
        );

        (records, report)
    }

    /// Append `record` unless its id was already admitted this run
    pub fn admit(
        &self,
        record: PlaceRecord,
        seen_ids: &mut HashSet<String>,
        records: &mut Vec<PlaceRecord>,
        report: &mut LoadReport,
    ) -> std::result::Result<(), SkipReason> {
        if !seen_ids.insert(record.id().to_string()) {
            report.record_skip(SkipReason::DuplicateId);
            return Err(SkipReason::DuplicateId);
        }
        report.loaded += 1;
        records.push(record);
        Ok(())
    }

    /// Validate a single entry
    pub fn load_entry(&self, raw: &RawPlace) -> std::result::Result<PlaceRecord, SkipReason> {
        if raw.business_status.is_none() {
            return Err(SkipReason::NotOperating);
        }

        let id = match raw.place_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(SkipReason::MissingId),
        };

        let location = raw
            .geometry
            .as_ref()
            .and_then(|g| g.location.as_ref())
            .ok_or(SkipReason::MissingCoordinate)?;
        let latitude = parse_coordinate(location.lat.as_ref(), 90.0)?;
        let longitude = parse_coordinate(location.lng.as_ref(), 180.0)?;

        let rating_count = parse_rating(raw.user_ratings_total.as_ref())?;
        let type_tag = self.build_type_tag(&raw.types);

        Ok(PlaceRecord::new(
            id,
            &raw.name,
            type_tag,
            rating_count,
            latitude,
            longitude,
            self.precision,
        ))
    }

    /// Join the first one or two non-ignored category tokens with `+`
    pub fn build_type_tag(&self, types: &[String]) -> String {
        types
            .iter()
            .filter(|t| !self.ignored_types.contains(t.as_str()))
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }
}

fn parse_coordinate(value: Option<&Value>, bound: f64) -> std::result::Result<f64, SkipReason> {
    let value = match value {
        None | Some(Value::Null) => return Err(SkipReason::MissingCoordinate),
        Some(v) => v,
    };
    match value.as_f64() {
        Some(v) if v.is_finite() && v.abs() <= bound => Ok(v),
        _ => Err(SkipReason::InvalidCoordinate),
    }
}

fn parse_rating(value: Option<&Value>) -> std::result::Result<u32, SkipReason> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(SkipReason::InvalidRating),
    }
}

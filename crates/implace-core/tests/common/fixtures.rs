//! Record builders shared by the integration tests

#![allow(dead_code)]

use implace_core::PlaceRecord;
use serde_json::{json, Value};

/// Degrees of latitude per meter on a 6373 km sphere
pub const METER_LAT: f64 = 1.0 / 111_230.0;

pub const BASE_LAT: f64 = -24.7859;
pub const BASE_LNG: f64 = -65.4116;

/// A record `north_m` meters north of the base point
pub fn place(id: &str, name: &str, type_tag: &str, ratings: u32, north_m: f64) -> PlaceRecord {
    PlaceRecord::new(
        id,
        name,
        type_tag,
        ratings,
        BASE_LAT + north_m * METER_LAT,
        BASE_LNG,
        7,
    )
}

/// A record at an explicit coordinate
pub fn place_at(id: &str, name: &str, type_tag: &str, ratings: u32, lat: f64, lng: f64) -> PlaceRecord {
    PlaceRecord::new(id, name, type_tag, ratings, lat, lng, 7)
}

/// A raw search API entry for an operating business
pub fn raw_entry(id: &str, name: &str, types: &[&str], ratings: Option<u64>, lat: f64, lng: f64) -> Value {
    let mut entry = json!({
        "place_id": id,
        "name": name,
        "types": types,
        "business_status": "OPERATIONAL",
        "geometry": {"location": {"lat": lat, "lng": lng}},
    });
    if let Some(r) = ratings {
        entry["user_ratings_total"] = json!(r);
    }
    entry
}

pub fn ids(records: &[PlaceRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id()).collect()
}

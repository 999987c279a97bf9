//! Great-circle distance

use crate::config::HaversineMode;

/// Earth mean radius in kilometers used by default
pub const EARTH_RADIUS_KM: f64 = 6373.0;

/// Haversine distance in kilometers between two lat/lng points in degrees
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_km_with(lat1, lng1, lat2, lng2, EARTH_RADIUS_KM, HaversineMode::Radians)
}

/// Haversine distance with an explicit radius and cross-term mode
///
/// [`HaversineMode::LegacyDegrees`] feeds the raw degree latitudes to `cos`,
/// matching runs produced before the cross term was corrected.
pub fn haversine_km_with(
    lat1: f64,
    lng1: f64,
    lat2: f64,
    lng2: f64,
    radius_km: f64,
    mode: HaversineMode,
) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let (cos1, cos2) = match mode {
        HaversineMode::Radians => (lat1.to_radians().cos(), lat2.to_radians().cos()),
        HaversineMode::LegacyDegrees => (lat1.cos(), lat2.cos()),
    };

    let a = (d_lat / 2.0).sin().powi(2) + cos1 * cos2 * (d_lng / 2.0).sin().powi(2);
    // Guard against a drifting just above 1.0 for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    radius_km * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

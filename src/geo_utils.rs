//! Geographic utilities shared by the analysis pipeline.
//!
//! Provides great-circle distance between samples, total track length,
//! and the unit-conversion constants used when presenting imperial units.

use crate::GeoSample;

/// Mean Earth radius in meters, used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters to feet (for imperial elevation display).
pub const METERS_TO_FEET: f64 = 3.28084;

/// Meters to miles (for imperial distance display).
pub const METERS_TO_MILES: f64 = 0.000_621_371;

/// Meters per second to miles per hour (for imperial speed display).
pub const MPS_TO_MPH: f64 = 2.236_94;

/// Great-circle distance between two samples in meters (haversine).
pub fn haversine_distance(a: &GeoSample, b: &GeoSample) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Total length of a track in meters, summed over consecutive sample pairs.
pub fn track_distance(samples: &[GeoSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

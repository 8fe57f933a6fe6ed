//! Geofence evaluation on a spherical earth.

use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::models::ClassLocation;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting values outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        shared::validation::validate_latitude(latitude)?;
        shared::validation::validate_longitude(longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Result of testing an observation against a class geofence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeofenceCheck {
    pub distance_meters: f64,
    pub inside: bool,
}

/// Great-circle distance between two points using the haversine formula.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

/// Returns true when `observed` lies on or inside the class radius.
pub fn within_geofence(observed: Coordinate, location: &ClassLocation) -> bool {
    evaluate(observed, location).inside
}

pub fn evaluate(observed: Coordinate, location: &ClassLocation) -> GeofenceCheck {
    let distance_meters = distance_meters(observed, location.center);
    GeofenceCheck {
        distance_meters,
        inside: distance_meters <= location.radius_meters,
    }
}

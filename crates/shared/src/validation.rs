//! Boundary validators for coordinates, radii and face descriptors.

use validator::ValidationError;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that a geofence radius is strictly positive and finite.
pub fn validate_radius(radius: f64) -> Result<(), ValidationError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be greater than 0 meters".into());
        Err(err)
    }
}

/// Validates that every component of a face descriptor is a finite number.
///
/// Length is checked separately against the configured model dimension.
pub fn validate_descriptor_values(values: &[f32]) -> Result<(), ValidationError> {
    if values.is_empty() {
        let mut err = ValidationError::new("descriptor_empty");
        err.message = Some("Face descriptor must not be empty".into());
        return Err(err);
    }
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("descriptor_values");
        err.message = Some("Face descriptor values must be finite numbers".into());
        Err(err)
    }
}

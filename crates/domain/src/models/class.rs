//! Class and class-location domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::services::geofence::Coordinate;

/// Registered position and acceptance radius of a class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassLocation {
    pub center: Coordinate,
    pub radius_meters: f64,
}

impl ClassLocation {
    /// Builds a location, rejecting a non-positive radius.
    pub fn new(center: Coordinate, radius_meters: f64) -> Result<Self, ValidationError> {
        shared::validation::validate_radius(radius_meters)?;
        Ok(Self {
            center,
            radius_meters,
        })
    }
}

/// A class students enrol in and attend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Returns the geofence of this class, if coordinates were registered.
    pub fn location(&self) -> Option<ClassLocation> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(ClassLocation {
                center: Coordinate {
                    latitude,
                    longitude,
                },
                radius_meters: self.radius_meters,
            }),
            _ => None,
        }
    }
}

/// Request payload for creating a class.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
}

impl CreateClassRequest {
    /// Checks coordinate ranges and that latitude and longitude come together.
    pub fn validate_location(&self) -> Result<(), ValidationError> {
        validate_location_fields(self.latitude, self.longitude, self.radius_meters)
    }
}

/// Partial class update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
}

impl UpdateClassRequest {
    pub fn validate_location(&self) -> Result<(), ValidationError> {
        validate_location_fields(self.latitude, self.longitude, self.radius_meters)
    }
}

fn validate_location_fields(
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_meters: Option<f64>,
) -> Result<(), ValidationError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => {
            Coordinate::new(lat, lon)?;
        }
        (None, None) => {}
        _ => {
            let mut err = ValidationError::new("location_pair");
            err.message = Some("Latitude and longitude must be provided together".into());
            return Err(err);
        }
    }
    if let Some(radius) = radius_meters {
        shared::validation::validate_radius(radius)?;
    }
    Ok(())
}

/// Enrollment payload. Already enrolled students are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollStudentsRequest {
    #[validate(length(min = 1, max = 500, message = "Provide 1-500 student ids"))]
    pub student_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub radius_meters: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Class> for ClassResponse {
    fn from(c: Class) -> Self {
        Self {
            id: c.id,
            name: c.name,
            latitude: c.latitude,
            longitude: c.longitude,
            radius_meters: c.radius_meters,
            created_by: c.created_by,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListClassesResponse {
    pub classes: Vec<ClassResponse>,
}

/// A student enrolled in a class.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledStudent {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_number: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEnrolledStudentsResponse {
    pub class_id: Uuid,
    pub students: Vec<EnrolledStudent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollStudentsResponse {
    pub class_id: Uuid,
    pub enrolled: u64,
}

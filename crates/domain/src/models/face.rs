//! Face descriptor and gallery models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Errors raised when building a descriptor.
#[derive(Debug, Error, PartialEq)]
pub enum DescriptorError {
    #[error("Face descriptor must have {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    InvalidValues(String),
}

/// Fixed-length face embedding produced by a recognition model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    /// Builds a descriptor of exactly `expected_len` finite values.
    pub fn new(values: Vec<f32>, expected_len: usize) -> Result<Self, DescriptorError> {
        if values.len() != expected_len {
            return Err(DescriptorError::LengthMismatch {
                expected: expected_len,
                actual: values.len(),
            });
        }
        shared::validation::validate_descriptor_values(&values).map_err(|e| {
            DescriptorError::InvalidValues(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;
        Ok(Self(values))
    }

    /// Wraps values that were validated before they were stored.
    pub fn from_stored(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    /// Euclidean distance to another descriptor, or `None` when lengths differ.
    pub fn euclidean_distance(&self, other: &FaceDescriptor) -> Option<f64> {
        if self.0.len() != other.0.len() {
            return None;
        }
        let sum: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = f64::from(*a) - f64::from(*b);
                d * d
            })
            .sum();
        Some(sum.sqrt())
    }
}

/// One enrolled descriptor and the student who owns it.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub owner_id: Uuid,
    pub descriptor: FaceDescriptor,
    pub enrolled_at: DateTime<Utc>,
}

/// Request payload for enrolling a face. Exactly one of `descriptor` or
/// `image_base64` must be present.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollFaceRequest {
    pub descriptor: Option<Vec<f32>>,

    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image_base64: Option<String>,

    /// Staff and owners may enrol on behalf of a student.
    pub student_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollFaceResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub descriptor_count: i64,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaceGalleryResponse {
    pub student_id: Uuid,
    pub descriptor_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(FaceDescriptor::new(vec![0.0; 128], 128).is_ok());
        assert_eq!(
            FaceDescriptor::new(vec![0.0; 64], 128),
            Err(DescriptorError::LengthMismatch {
                expected: 128,
                actual: 64
            })
        );
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let err = FaceDescriptor::new(vec![0.1, f32::NAN, 0.2], 3).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidValues(_)));
    }

    #[test]
    fn test_euclidean_distance() {
        let a = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        let b = FaceDescriptor::from_stored(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b).unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(a.euclidean_distance(&a), Some(0.0));
    }

    #[test]
    fn test_euclidean_distance_length_mismatch() {
        let a = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        let b = FaceDescriptor::from_stored(vec![0.0, 0.0, 0.0]);
        assert!(a.euclidean_distance(&b).is_none());
    }

    #[test]
    fn test_descriptor_serializes_as_array() {
        let d = FaceDescriptor::from_stored(vec![0.5, -0.25]);
        assert_eq!(serde_json::to_string(&d).unwrap(), "[0.5,-0.25]");
    }
}

//! Domain services and collaborator traits.

pub mod attendance_resolver;
pub mod attendance_store;
pub mod face_encoder;
pub mod face_matcher;
pub mod geofence;
pub mod grading;

pub use attendance_resolver::{
    AttendancePolicy, AttendanceResolver, FaceEvidence, Resolution, ResolutionError, ReviewDecision,
    Submission,
};
pub use attendance_store::{AttendanceStore, StoreError};
pub use face_encoder::{FaceEncoder, FaceEncoderError};
pub use face_matcher::{EuclideanMatcher, FaceMatch, FaceMatcher};
pub use geofence::{Coordinate, GeofenceCheck};

//! Domain layer for the Attendify backend.
//!
//! This crate contains:
//! - Domain models and request/response payloads
//! - The attendance core: geofence evaluation, face matching and resolution
//! - Grading and CGPA computation
//! - Collaborator traits for storage and face encoding

pub mod models;
pub mod services;

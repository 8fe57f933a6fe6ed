//! Domain models for Attendify.

pub mod attendance;
pub mod class;
pub mod face;
pub mod marks;
pub mod user;

pub use attendance::{
    AttendanceRecord, AttendanceRequest, AttendanceRequestStatus, AttendanceStatus, MarkedBy,
};
pub use class::{Class, ClassLocation};
pub use face::{FaceDescriptor, GalleryEntry};
pub use marks::{Mark, Subject};
pub use user::{Role, User};

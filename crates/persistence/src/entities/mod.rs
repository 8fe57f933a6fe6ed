//! Entity definitions (database row mappings).

pub mod attendance;
pub mod class;
pub mod face;
pub mod marks;
pub mod user;

pub use attendance::{
    AttendanceRecordEntity, AttendanceRequestEntity, AttendanceRequestStatusDb,
    AttendanceStatusDb,
};
pub use class::{ClassEntity, EnrolledStudentEntity};
pub use face::{FaceDescriptorEntity, GalleryEntryEntity};
pub use marks::{MarkEntity, SubjectEntity};
pub use user::{UserEntity, UserRoleDb};

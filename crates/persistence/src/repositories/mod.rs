//! Repository implementations for database operations.

pub mod attendance;
pub mod class;
pub mod face;
pub mod marks;
pub mod user;

pub use attendance::{AttendanceRecordRepository, AttendanceRequestRepository, NewRequestInput};
pub use class::ClassRepository;
pub use face::FaceDescriptorRepository;
pub use marks::{MarkRepository, SubjectRepository};
pub use user::{NewUserInput, UserRepository};

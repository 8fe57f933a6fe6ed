//! Storage contract used by the attendance resolver.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::attendance::{NewAttendanceRecord, NewAttendanceRequest};
use crate::models::{
    AttendanceRecord, AttendanceRequest, AttendanceRequestStatus, AttendanceStatus, Class,
    GalleryEntry,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable state behind attendance resolution.
///
/// `put_record` is a keyed put: writing a record for an existing
/// (student, class, date) replaces its status and `marked_by`, so concurrent
/// duplicates converge on one row and the last write wins.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_class(&self, class_id: Uuid) -> Result<Option<Class>, StoreError>;

    async fn is_enrolled(&self, class_id: Uuid, student_id: Uuid) -> Result<bool, StoreError>;

    /// All descriptors owned by students enrolled in the class.
    async fn class_gallery(&self, class_id: Uuid) -> Result<Vec<GalleryEntry>, StoreError>;

    async fn put_record(&self, record: NewAttendanceRecord)
        -> Result<AttendanceRecord, StoreError>;

    /// Files a pending request. At most one request per (student, class,
    /// date) is pending; a repeat refreshes its location and distances.
    async fn create_request(
        &self,
        request: NewAttendanceRequest,
    ) -> Result<AttendanceRequest, StoreError>;

    async fn find_request(&self, request_id: Uuid)
        -> Result<Option<AttendanceRequest>, StoreError>;

    /// Atomically moves a pending request to `decision` and puts the matching
    /// record with `status`. Returns `None` when the request is missing or no
    /// longer pending; nothing is written in that case.
    async fn settle_request(
        &self,
        request_id: Uuid,
        decision: AttendanceRequestStatus,
        status: AttendanceStatus,
        reviewed_by: Uuid,
    ) -> Result<Option<(AttendanceRequest, AttendanceRecord)>, StoreError>;
}

//! Attendance record and request entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{
    AttendanceRecord, AttendanceRequest, AttendanceRequestStatus, AttendanceStatus, MarkedBy,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
pub enum AttendanceStatusDb {
    Present,
    Absent,
    OnDuty,
    Leave,
}

impl From<AttendanceStatusDb> for AttendanceStatus {
    fn from(status: AttendanceStatusDb) -> Self {
        match status {
            AttendanceStatusDb::Present => AttendanceStatus::Present,
            AttendanceStatusDb::Absent => AttendanceStatus::Absent,
            AttendanceStatusDb::OnDuty => AttendanceStatus::OnDuty,
            AttendanceStatusDb::Leave => AttendanceStatus::Leave,
        }
    }
}

impl From<AttendanceStatus> for AttendanceStatusDb {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => AttendanceStatusDb::Present,
            AttendanceStatus::Absent => AttendanceStatusDb::Absent,
            AttendanceStatus::OnDuty => AttendanceStatusDb::OnDuty,
            AttendanceStatus::Leave => AttendanceStatusDb::Leave,
        }
    }
}

/// Database enum for attendance request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "attendance_request_status", rename_all = "lowercase")]
pub enum AttendanceRequestStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<AttendanceRequestStatusDb> for AttendanceRequestStatus {
    fn from(status: AttendanceRequestStatusDb) -> Self {
        match status {
            AttendanceRequestStatusDb::Pending => AttendanceRequestStatus::Pending,
            AttendanceRequestStatusDb::Approved => AttendanceRequestStatus::Approved,
            AttendanceRequestStatusDb::Rejected => AttendanceRequestStatus::Rejected,
        }
    }
}

impl From<AttendanceRequestStatus> for AttendanceRequestStatusDb {
    fn from(status: AttendanceRequestStatus) -> Self {
        match status {
            AttendanceRequestStatus::Pending => AttendanceRequestStatusDb::Pending,
            AttendanceRequestStatus::Approved => AttendanceRequestStatusDb::Approved,
            AttendanceRequestStatus::Rejected => AttendanceRequestStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the attendance_records table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRecordEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatusDb,
    /// NULL when marked automatically.
    pub marked_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AttendanceRecordEntity> for AttendanceRecord {
    fn from(entity: AttendanceRecordEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            class_id: entity.class_id,
            attendance_date: entity.attendance_date,
            status: entity.status.into(),
            marked_by: entity.marked_by.map_or(MarkedBy::Auto, MarkedBy::User),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the attendance_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRequestEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub geo_distance_meters: f64,
    pub face_distance: Option<f64>,
    pub status: AttendanceRequestStatusDb,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AttendanceRequestEntity> for AttendanceRequest {
    fn from(entity: AttendanceRequestEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            class_id: entity.class_id,
            attendance_date: entity.attendance_date,
            latitude: entity.latitude,
            longitude: entity.longitude,
            geo_distance_meters: entity.geo_distance_meters,
            face_distance: entity.face_distance,
            status: entity.status.into(),
            reviewed_by: entity.reviewed_by,
            reviewed_at: entity.reviewed_at,
            created_at: entity.created_at,
        }
    }
}

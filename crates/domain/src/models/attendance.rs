//! Attendance records, pending requests and their HTTP payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::services::geofence::Coordinate;

/// Attendance status of a student for one class on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OnDuty,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::OnDuty => "on_duty",
            AttendanceStatus::Leave => "leave",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who wrote a record: the automatic resolver or a reviewing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MarkedBy {
    Auto,
    User(Uuid),
}

impl fmt::Display for MarkedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkedBy::Auto => write!(f, "auto"),
            MarkedBy::User(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for MarkedBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(MarkedBy::Auto);
        }
        Uuid::parse_str(s)
            .map(MarkedBy::User)
            .map_err(|_| format!("Invalid marked_by value: {}", s))
    }
}

impl From<MarkedBy> for String {
    fn from(m: MarkedBy) -> Self {
        m.to_string()
    }
}

impl TryFrom<String> for MarkedBy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One attendance row. Unique per (student, class, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: MarkedBy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by an attendance upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: MarkedBy,
}

/// Lifecycle of an attendance request. Approved and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl AttendanceRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceRequestStatus::Pending => "pending",
            AttendanceRequestStatus::Approved => "approved",
            AttendanceRequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttendanceRequestStatus::Pending)
    }
}

impl fmt::Display for AttendanceRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttendanceRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AttendanceRequestStatus::Pending),
            "approved" => Ok(AttendanceRequestStatus::Approved),
            "rejected" => Ok(AttendanceRequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// A submission that failed automatic acceptance and awaits review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub geo_distance_meters: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_distance: Option<f64>,
    pub status: AttendanceRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Values for a newly opened attendance request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRequest {
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub attendance_date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub geo_distance_meters: f64,
    pub face_distance: Option<f64>,
}

/// Request payload for a geofenced, face-assisted submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttendanceRequest {
    pub class_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub descriptor: Option<Vec<f32>>,

    #[validate(length(min = 1, message = "Image must not be empty"))]
    pub image_base64: Option<String>,
}

impl SubmitAttendanceRequest {
    pub fn coordinate(&self) -> Result<Coordinate, ValidationError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Request payload for manual marking by staff.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualAttendanceRequest {
    pub class_id: Uuid,
    pub student_id: Uuid,
    /// Defaults to today in the configured timezone.
    pub date: Option<NaiveDate>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassAttendanceQuery {
    pub class_id: Uuid,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyAttendanceQuery {
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAttendanceRequestsQuery {
    pub class_id: Option<Uuid>,
    pub status: Option<AttendanceRequestStatus>,
}

/// Outcome of a submission, tagged by `outcome`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitAttendanceResponse {
    Present {
        record: AttendanceRecord,
        geo_distance_meters: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        face_distance: Option<f64>,
    },
    Pending {
        request: AttendanceRequest,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAttendanceResponse {
    pub records: Vec<AttendanceRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAttendanceRequestsResponse {
    pub requests: Vec<AttendanceRequest>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewAttendanceResponse {
    pub request: AttendanceRequest,
    pub record: AttendanceRecord,
}

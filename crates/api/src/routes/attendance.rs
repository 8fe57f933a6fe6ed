//! Attendance submission, manual marking and request review routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::attendance::{
    ClassAttendanceQuery, ListAttendanceRequestsQuery, ListAttendanceRequestsResponse,
    ListAttendanceResponse, ManualAttendanceRequest, MyAttendanceQuery,
    ReviewAttendanceResponse, SubmitAttendanceRequest, SubmitAttendanceResponse,
};
use domain::models::{AttendanceRecord, AttendanceRequest, FaceDescriptor};
use domain::services::{FaceEvidence, Resolution, ReviewDecision, Submission};
use persistence::repositories::{
    AttendanceRecordRepository, AttendanceRequestRepository, ClassRepository,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;
use crate::middleware::metrics::{record_attendance_resolution, record_attendance_review};
use crate::routes::faces::encode_image;

/// POST /api/v1/attendance/submit
///
/// Students claim themselves and the face must match them. Staff and owner
/// submissions act as a kiosk: the identity comes from the face match.
/// Responds 201 when marked present, 202 when a pending request was filed.
pub async fn submit(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<SubmitAttendanceRequest>,
) -> Result<(StatusCode, Json<SubmitAttendanceResponse>), ApiError> {
    request.validate()?;
    let coordinate = request.coordinate()?;

    let face = match (request.descriptor, request.image_base64) {
        (Some(values), None) => FaceEvidence::Descriptor(FaceDescriptor::new(
            values,
            state.config.face.descriptor_length,
        )?),
        (None, Some(image)) => match encode_image(&state, &image).await? {
            Some(descriptor) => FaceEvidence::Descriptor(descriptor),
            None => FaceEvidence::NotDetected,
        },
        (None, None) => FaceEvidence::NotProvided,
        (Some(_), Some(_)) => {
            return Err(ApiError::Validation(
                "Provide either descriptor or image_base64, not both".to_string(),
            ))
        }
    };

    let submission = Submission {
        class_id: request.class_id,
        claimed_student: (!actor.role.can_manage()).then_some(actor.user_id),
        coordinate,
        face,
        date: state.config.attendance.today(),
    };

    let resolution = match state.resolver.resolve(submission).await {
        Ok(resolution) => resolution,
        Err(e) => {
            record_attendance_resolution(e.outcome());
            return Err(e.into());
        }
    };
    record_attendance_resolution(resolution.outcome());

    let (status, body) = match resolution {
        Resolution::Present {
            record,
            geo,
            face_distance,
        } => (
            StatusCode::CREATED,
            SubmitAttendanceResponse::Present {
                record,
                geo_distance_meters: geo.distance_meters,
                face_distance,
            },
        ),
        Resolution::Pending { request } => (
            StatusCode::ACCEPTED,
            SubmitAttendanceResponse::Pending { request },
        ),
    };

    Ok((status, Json(body)))
}

/// POST /api/v1/attendance/manual
///
/// Staff or owner. Overwrites any existing record for the same day.
pub async fn mark_manual(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<ManualAttendanceRequest>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    actor.require_manager()?;

    let classes = ClassRepository::new(state.pool.clone());
    if classes.find_by_id(request.class_id).await?.is_none() {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }
    if !classes
        .is_enrolled(request.class_id, request.student_id)
        .await?
    {
        return Err(ApiError::Validation(
            "Student is not enrolled in this class".to_string(),
        ));
    }

    let date = request
        .date
        .unwrap_or_else(|| state.config.attendance.today());

    let record = AttendanceRecordRepository::new(state.pool.clone())
        .upsert(
            request.student_id,
            request.class_id,
            date,
            request.status.into(),
            Some(actor.user_id),
        )
        .await?;

    info!(
        student_id = %request.student_id,
        class_id = %request.class_id,
        date = %date,
        status = %request.status,
        marked_by = %actor.user_id,
        "Attendance marked manually"
    );
    Ok(Json(record.into()))
}

/// GET /api/v1/attendance?class_id=&date=
///
/// Staff or owner. `date` defaults to today.
pub async fn list_for_class(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ClassAttendanceQuery>,
) -> Result<Json<ListAttendanceResponse>, ApiError> {
    actor.require_manager()?;

    let date = query
        .date
        .unwrap_or_else(|| state.config.attendance.today());
    let records: Vec<AttendanceRecord> = AttendanceRecordRepository::new(state.pool.clone())
        .list_for_class(query.class_id, date)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListAttendanceResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/v1/attendance/me?class_id=
pub async fn list_mine(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<MyAttendanceQuery>,
) -> Result<Json<ListAttendanceResponse>, ApiError> {
    let records: Vec<AttendanceRecord> = AttendanceRecordRepository::new(state.pool.clone())
        .list_for_student(actor.user_id, query.class_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListAttendanceResponse {
        total: records.len(),
        records,
    }))
}

/// GET /api/v1/attendance/requests?class_id=&status=
pub async fn list_requests(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListAttendanceRequestsQuery>,
) -> Result<Json<ListAttendanceRequestsResponse>, ApiError> {
    actor.require_manager()?;

    let requests: Vec<AttendanceRequest> = AttendanceRequestRepository::new(state.pool.clone())
        .list(query.class_id, query.status.map(Into::into))
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListAttendanceRequestsResponse {
        total: requests.len(),
        requests,
    }))
}

/// POST /api/v1/attendance/requests/:request_id/approve
pub async fn approve_request(
    state: State<AppState>,
    actor: Actor,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ReviewAttendanceResponse>, ApiError> {
    review(state, actor, request_id, ReviewDecision::Approve).await
}

/// POST /api/v1/attendance/requests/:request_id/reject
pub async fn reject_request(
    state: State<AppState>,
    actor: Actor,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ReviewAttendanceResponse>, ApiError> {
    review(state, actor, request_id, ReviewDecision::Reject).await
}

async fn review(
    State(state): State<AppState>,
    actor: Actor,
    request_id: Uuid,
    decision: ReviewDecision,
) -> Result<Json<ReviewAttendanceResponse>, ApiError> {
    actor.require_manager()?;

    let (request, record) = state
        .resolver
        .review(request_id, decision, actor.user_id)
        .await?;
    record_attendance_review(request.status.as_str());

    Ok(Json(ReviewAttendanceResponse { request, record }))
}

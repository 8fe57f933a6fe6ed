//! Subject, marks and result routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::marks::{
    CreateSubjectRequest, ListSubjectsResponse, ResultSheet, UpsertMarkRequest,
};
use domain::models::{Mark, Subject};
use domain::services::grading::build_result_sheet;
use persistence::repositories::{ClassRepository, MarkRepository, SubjectRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// POST /api/v1/classes/:class_id/subjects
///
/// Staff or owner. Subject codes are unique within a class.
pub async fn create_subject(
    State(state): State<AppState>,
    actor: Actor,
    Path(class_id): Path<Uuid>,
    Json(request): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), ApiError> {
    actor.require_manager()?;
    request.validate()?;

    if ClassRepository::new(state.pool.clone())
        .find_by_id(class_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }

    let subject = SubjectRepository::new(state.pool.clone())
        .create(
            class_id,
            request.code.trim(),
            request.name.trim(),
            request.credits,
        )
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict("Subject code already exists in this class".to_string())
            }
            other => other,
        })?;

    info!(class_id = %class_id, subject_id = %subject.id, "Subject created");
    Ok((StatusCode::CREATED, Json(subject.into())))
}

/// GET /api/v1/classes/:class_id/subjects
pub async fn list_subjects(
    State(state): State<AppState>,
    _actor: Actor,
    Path(class_id): Path<Uuid>,
) -> Result<Json<ListSubjectsResponse>, ApiError> {
    let subjects = SubjectRepository::new(state.pool.clone())
        .list_for_class(class_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListSubjectsResponse { subjects }))
}

/// PUT /api/v1/marks
///
/// Staff or owner. The student must be enrolled in the subject's class.
/// Keyed on (student, subject, exam); a second write replaces the first.
pub async fn upsert_mark(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<UpsertMarkRequest>,
) -> Result<Json<Mark>, ApiError> {
    actor.require_manager()?;
    request.validate()?;
    request.validate_scores()?;

    let subject = SubjectRepository::new(state.pool.clone())
        .find_by_id(request.subject_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;
    if !ClassRepository::new(state.pool.clone())
        .is_enrolled(subject.class_id, request.student_id)
        .await?
    {
        return Err(ApiError::Validation(
            "Student is not enrolled in this class".to_string(),
        ));
    }

    let mark = MarkRepository::new(state.pool.clone())
        .upsert(
            request.student_id,
            request.subject_id,
            request.exam.trim(),
            request.score,
            request.max_score,
            actor.user_id,
        )
        .await?;

    info!(
        student_id = %request.student_id,
        subject_id = %request.subject_id,
        exam = %mark.exam,
        recorded_by = %actor.user_id,
        "Mark recorded"
    );
    Ok(Json(mark.into()))
}

/// GET /api/v1/results/me
pub async fn my_results(
    state: State<AppState>,
    actor: Actor,
) -> Result<Json<ResultSheet>, ApiError> {
    let student_id = actor.user_id;
    student_results(state, actor, Path(student_id)).await
}

/// GET /api/v1/results/:student_id
///
/// The student themselves, or staff and owners.
pub async fn student_results(
    State(state): State<AppState>,
    actor: Actor,
    Path(student_id): Path<Uuid>,
) -> Result<Json<ResultSheet>, ApiError> {
    actor.require_self_or_manager(student_id)?;

    let subjects: Vec<Subject> = SubjectRepository::new(state.pool.clone())
        .list_for_student(student_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let marks: Vec<Mark> = MarkRepository::new(state.pool.clone())
        .list_for_student(student_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(build_result_sheet(student_id, &subjects, &marks)))
}

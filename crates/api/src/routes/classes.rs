//! Class, location and enrollment routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::class::{
    ClassResponse, CreateClassRequest, EnrollStudentsRequest, EnrollStudentsResponse,
    ListClassesResponse, ListEnrolledStudentsResponse, UpdateClassRequest,
};
use domain::models::Class;
use persistence::repositories::ClassRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// POST /api/v1/classes
///
/// Staff or owner. Coordinates are optional but must come as a pair.
pub async fn create_class(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    actor.require_manager()?;
    request.validate()?;
    request.validate_location()?;

    let radius = request
        .radius_meters
        .unwrap_or(state.config.attendance.default_radius_meters);

    let class = ClassRepository::new(state.pool.clone())
        .create(
            request.name.trim(),
            request.latitude,
            request.longitude,
            radius,
            actor.user_id,
        )
        .await?;

    info!(class_id = %class.id, created_by = %actor.user_id, "Class created");
    Ok((StatusCode::CREATED, Json(Class::from(class).into())))
}

/// GET /api/v1/classes
///
/// Managers see every class; students see the classes they are enrolled in.
pub async fn list_classes(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<ListClassesResponse>, ApiError> {
    let repo = ClassRepository::new(state.pool.clone());
    let classes = if actor.role.can_manage() {
        repo.list().await?
    } else {
        repo.list_for_student(actor.user_id).await?
    };

    Ok(Json(ListClassesResponse {
        classes: classes
            .into_iter()
            .map(|c| Class::from(c).into())
            .collect(),
    }))
}

/// GET /api/v1/classes/:class_id
pub async fn get_class(
    State(state): State<AppState>,
    _actor: Actor,
    Path(class_id): Path<Uuid>,
) -> Result<Json<ClassResponse>, ApiError> {
    let class = ClassRepository::new(state.pool.clone())
        .find_by_id(class_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    Ok(Json(Class::from(class).into()))
}

/// PATCH /api/v1/classes/:class_id
pub async fn update_class(
    State(state): State<AppState>,
    actor: Actor,
    Path(class_id): Path<Uuid>,
    Json(request): Json<UpdateClassRequest>,
) -> Result<Json<ClassResponse>, ApiError> {
    actor.require_manager()?;
    request.validate()?;
    request.validate_location()?;

    let class = ClassRepository::new(state.pool.clone())
        .update(
            class_id,
            request.name.as_deref().map(str::trim),
            request.latitude,
            request.longitude,
            request.radius_meters,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    info!(class_id = %class_id, updated_by = %actor.user_id, "Class updated");
    Ok(Json(Class::from(class).into()))
}

/// PUT /api/v1/classes/:class_id/students
///
/// Idempotent: students already enrolled are skipped.
pub async fn enroll_students(
    State(state): State<AppState>,
    actor: Actor,
    Path(class_id): Path<Uuid>,
    Json(request): Json<EnrollStudentsRequest>,
) -> Result<Json<EnrollStudentsResponse>, ApiError> {
    actor.require_manager()?;
    request.validate()?;

    let repo = ClassRepository::new(state.pool.clone());
    if repo.find_by_id(class_id).await?.is_none() {
        return Err(ApiError::NotFound("Class not found".to_string()));
    }

    let enrolled = repo.enroll_students(class_id, &request.student_ids).await?;

    info!(class_id = %class_id, enrolled, "Students enrolled");
    Ok(Json(EnrollStudentsResponse { class_id, enrolled }))
}

/// GET /api/v1/classes/:class_id/students
pub async fn list_students(
    State(state): State<AppState>,
    actor: Actor,
    Path(class_id): Path<Uuid>,
) -> Result<Json<ListEnrolledStudentsResponse>, ApiError> {
    actor.require_manager()?;

    let students = ClassRepository::new(state.pool.clone())
        .list_students(class_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(ListEnrolledStudentsResponse { class_id, students }))
}

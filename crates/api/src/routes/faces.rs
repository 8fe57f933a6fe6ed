//! Face gallery routes.

use axum::{extract::State, http::StatusCode, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::models::face::{EnrollFaceRequest, EnrollFaceResponse, FaceGalleryResponse};
use domain::models::FaceDescriptor;
use domain::services::ResolutionError;
use persistence::repositories::FaceDescriptorRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// Decodes a base64 image and runs it through the face encoder.
/// `Ok(None)` means the encoder found no face.
pub(crate) async fn encode_image(
    state: &AppState,
    image_base64: &str,
) -> Result<Option<FaceDescriptor>, ApiError> {
    let image = STANDARD
        .decode(image_base64.trim())
        .map_err(|_| ApiError::Validation("image_base64 is not valid base64".to_string()))?;

    let encoder = state.face_encoder.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Face recognition is not configured".to_string())
    })?;

    Ok(encoder.encode(&image).await?)
}

/// POST /api/v1/faces
///
/// Students enrol their own face; staff and owners may pass `student_id`.
/// Each call adds one descriptor to the gallery.
pub async fn enroll_face(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<EnrollFaceRequest>,
) -> Result<(StatusCode, Json<EnrollFaceResponse>), ApiError> {
    request.validate()?;

    let student_id = request.student_id.unwrap_or(actor.user_id);
    actor.require_self_or_manager(student_id)?;

    let descriptor = match (request.descriptor, request.image_base64) {
        (Some(values), None) => FaceDescriptor::new(values, state.config.face.descriptor_length)?,
        (None, Some(image)) => encode_image(&state, &image)
            .await?
            .ok_or_else(|| ApiError::from(ResolutionError::NoFaceDetected))?,
        (Some(_), Some(_)) => {
            return Err(ApiError::Validation(
                "Provide either descriptor or image_base64, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(ApiError::Validation(
                "A descriptor or image_base64 is required".to_string(),
            ))
        }
    };

    let repo = FaceDescriptorRepository::new(state.pool.clone());
    let created = repo.create(student_id, descriptor.as_slice()).await?;
    let descriptor_count = repo.count_for_student(student_id).await?;

    info!(
        student_id = %student_id,
        enrolled_by = %actor.user_id,
        descriptor_count,
        "Face descriptor enrolled"
    );

    Ok((
        StatusCode::CREATED,
        Json(EnrollFaceResponse {
            id: created.id,
            student_id,
            descriptor_count,
            enrolled_at: created.created_at,
        }),
    ))
}

/// GET /api/v1/faces/me
pub async fn get_my_gallery(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<FaceGalleryResponse>, ApiError> {
    let descriptor_count = FaceDescriptorRepository::new(state.pool.clone())
        .count_for_student(actor.user_id)
        .await?;

    Ok(Json(FaceGalleryResponse {
        student_id: actor.user_id,
        descriptor_count,
    }))
}

/// DELETE /api/v1/faces/me
pub async fn clear_my_gallery(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<StatusCode, ApiError> {
    let removed = FaceDescriptorRepository::new(state.pool.clone())
        .delete_for_student(actor.user_id)
        .await?;

    info!(student_id = %actor.user_id, removed, "Face gallery cleared");
    Ok(StatusCode::NO_CONTENT)
}

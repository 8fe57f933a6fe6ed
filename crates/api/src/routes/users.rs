//! Profile and role management routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::user::{
    AssignRoleRequest, ListUsersQuery, ListUsersResponse, UpdateProfileRequest, UserResponse,
};
use domain::models::{Role, User};
use persistence::repositories::UserRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Actor;

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(actor.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(User::from(user).into()))
}

/// PATCH /api/v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    request.validate()?;

    let user = UserRepository::new(state.pool.clone())
        .update_profile(
            actor.user_id,
            request.display_name.as_deref().map(str::trim),
            request.roll_number.as_deref(),
            request.phone.as_deref(),
            request.department.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %actor.user_id, "Profile updated");
    Ok(Json(User::from(user).into()))
}

/// GET /api/v1/users?role=
///
/// Staff or owner.
pub async fn list_users(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    actor.require_manager()?;

    let users: Vec<UserResponse> = UserRepository::new(state.pool.clone())
        .list(query.role.map(Into::into))
        .await?
        .into_iter()
        .map(|e| User::from(e).into())
        .collect();

    Ok(Json(ListUsersResponse {
        total: users.len(),
        users,
    }))
}

/// PUT /api/v1/users/:user_id/role
///
/// Owner only. An owner cannot change their own role.
pub async fn assign_role(
    State(state): State<AppState>,
    actor: Actor,
    Path(user_id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.require_owner()?;

    if user_id == actor.user_id && request.role != Role::Owner {
        return Err(ApiError::Validation(
            "Owners cannot demote themselves".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool.clone())
        .update_role(user_id, request.role.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(
        user_id = %user_id,
        role = %request.role,
        assigned_by = %actor.user_id,
        "Role assigned"
    );
    Ok(Json(User::from(user).into()))
}

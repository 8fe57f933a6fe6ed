//! Signup and login routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{AuthResponse, LoginRequest, SignupRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::AuthService;

/// POST /api/v1/auth/signup
///
/// The first account ever created becomes the owner.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let response = AuthService::new(state.pool.clone(), state.jwt.clone())
        .signup(
            &request.email,
            &request.password,
            &request.display_name,
            request.roll_number.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let response = AuthService::new(state.pool.clone(), state.jwt.clone())
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

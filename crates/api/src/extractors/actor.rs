//! Authenticated actor with its current role.
//!
//! The role is read from the database on every request so that role changes
//! take effect without reissuing tokens.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use persistence::repositories::UserRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    /// Owner or staff.
    pub fn require_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Staff or owner role required".to_string(),
            ))
        }
    }

    pub fn require_owner(&self) -> Result<(), ApiError> {
        if self.role.can_assign_roles() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Owner role required".to_string()))
        }
    }

    /// The actor themselves, or a manager acting on someone else.
    pub fn require_self_or_manager(&self, user_id: Uuid) -> Result<(), ApiError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            self.require_manager()
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let role = UserRepository::new(state.pool.clone())
            .find_role(auth.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

        Ok(Self {
            user_id: auth.user_id,
            role: role.into(),
        })
    }
}

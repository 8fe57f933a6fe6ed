//! Signup and login.

use std::sync::Arc;

use domain::models::user::{AuthResponse, User, UserResponse};
use persistence::repositories::{NewUserInput, UserRepository};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_password_policy, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Weak(msg) => AuthError::WeakPassword(msg),
            other => AuthError::PasswordError(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthError::WeakPassword(msg) => ApiError::Validation(msg.to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::DatabaseError(e) => ApiError::from(e),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
        }
    }
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Registers a user. The first account ever created becomes owner.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        roll_number: Option<&str>,
    ) -> Result<AuthResponse, AuthError> {
        check_password_policy(password)?;
        let password_hash = hash_password(password)?;
        let email = email.trim().to_lowercase();

        let entity = self
            .users
            .create_with_bootstrap_role(NewUserInput {
                email: &email,
                password_hash: &password_hash,
                display_name: display_name.trim(),
                roll_number,
            })
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.code().as_deref() == Some("23505") => {
                    AuthError::EmailAlreadyExists
                }
                other => AuthError::DatabaseError(other),
            })?;

        let user: User = entity.into();
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue(user)
    }

    /// Verifies credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = email.trim().to_lowercase();
        let Some(entity) = self.users.find_by_email(&email).await? else {
            tracing::debug!("Login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &entity.password_hash)? {
            tracing::debug!(user_id = %entity.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user: User = entity.into();
        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    fn issue(&self, user: User) -> Result<AuthResponse, AuthError> {
        let (access_token, _jti) = self.jwt.issue_access_token(user.id)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_weak_password_maps_to_validation() {
        let err: AuthError = PasswordError::Weak("Password must contain a digit").into();
        assert!(matches!(err, AuthError::WeakPassword(_)));
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            ApiError::from(AuthError::EmailAlreadyExists)
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}

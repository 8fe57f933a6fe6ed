//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Owner,
    Staff,
    Student,
}

impl From<UserRoleDb> for Role {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Owner => Role::Owner,
            UserRoleDb::Staff => Role::Staff,
            UserRoleDb::Student => Role::Student,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Owner => UserRoleDb::Owner,
            Role::Staff => UserRoleDb::Staff,
            Role::Student => UserRoleDb::Student,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRoleDb,
    pub roll_number: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            role: entity.role.into(),
            roll_number: entity.roll_number,
            phone: entity.phone,
            department: entity.department,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

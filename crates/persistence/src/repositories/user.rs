//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

/// Lock key serialising the first-owner decision across signups.
const SIGNUP_LOCK_KEY: i64 = 0x4154_5444_4e44_0001;

const USER_COLUMNS: &str = "id, email, password_hash, display_name, role, roll_number, phone, department, created_at, updated_at";

/// Values for a new account.
#[derive(Debug, Clone)]
pub struct NewUserInput<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: &'a str,
    pub roll_number: Option<&'a str>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user. The first user ever created becomes owner; everyone
    /// else starts as a student.
    ///
    /// The existence check and insert run in one transaction under an
    /// advisory lock so concurrent first signups cannot both become owner.
    pub async fn create_with_bootstrap_role(
        &self,
        input: NewUserInput<'_>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = self.create_in_tx(input).await;
        timer.record_result(&result);
        result
    }

    async fn create_in_tx(&self, input: NewUserInput<'_>) -> Result<UserEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SIGNUP_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let any_user: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users)")
            .fetch_one(&mut *tx)
            .await?;
        let role = if any_user {
            UserRoleDb::Student
        } else {
            UserRoleDb::Owner
        };

        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_hash, display_name, role, roll_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(input.email)
        .bind(input.password_hash)
        .bind(input.display_name)
        .bind(role)
        .bind(input.roll_number)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Emails are stored lower-cased; callers pass the normalised form.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Role lookup used by request authorization.
    pub async fn find_role(&self, id: Uuid) -> Result<Option<UserRoleDb>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_role");
        let result = sqlx::query_scalar::<_, UserRoleDb>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record_result(&result);
        result
    }

    /// Partial profile update; `None` leaves a field unchanged.
    pub async fn update_profile(
        &self,
        id: Uuid,
        display_name: Option<&str>,
        roll_number: Option<&str>,
        phone: Option<&str>,
        department: Option<&str>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                roll_number = COALESCE($3, roll_number),
                phone = COALESCE($4, phone),
                department = COALESCE($5, department),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(display_name)
        .bind(roll_number)
        .bind(phone)
        .bind(department)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn update_role(
        &self,
        id: Uuid,
        role: UserRoleDb,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_role");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Lists users ordered by name, optionally filtered by role.
    pub async fn list(&self, role: Option<UserRoleDb>) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY display_name, email
            "#
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

//! Class and enrollment repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ClassEntity, EnrolledStudentEntity};
use crate::metrics::QueryTimer;

const CLASS_COLUMNS: &str =
    "id, name, latitude, longitude, radius_meters, created_by, created_at, updated_at";

/// Repository for classes and class enrollments.
#[derive(Clone)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_meters: f64,
        created_by: Uuid,
    ) -> Result<ClassEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_class");
        let result = sqlx::query_as::<_, ClassEntity>(&format!(
            r#"
            INSERT INTO classes (name, latitude, longitude, radius_meters, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(radius_meters)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_class_by_id");
        let result = sqlx::query_as::<_, ClassEntity>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn list(&self) -> Result<Vec<ClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_classes");
        let result = sqlx::query_as::<_, ClassEntity>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes ORDER BY name, created_at"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Classes a student is enrolled in.
    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<ClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_classes_for_student");
        let result = sqlx::query_as::<_, ClassEntity>(
            r#"
            SELECT c.id, c.name, c.latitude, c.longitude, c.radius_meters, c.created_by,
                   c.created_at, c.updated_at
            FROM classes c
            JOIN class_enrollments e ON e.class_id = c.id
            WHERE e.student_id = $1
            ORDER BY c.name, c.created_at
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Partial update; `None` leaves a field unchanged.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        radius_meters: Option<f64>,
    ) -> Result<Option<ClassEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_class");
        let result = sqlx::query_as::<_, ClassEntity>(&format!(
            r#"
            UPDATE classes SET
                name = COALESCE($2, name),
                latitude = COALESCE($3, latitude),
                longitude = COALESCE($4, longitude),
                radius_meters = COALESCE($5, radius_meters),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(radius_meters)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Enrolls students, ignoring those already enrolled. Returns the number
    /// of new enrollments.
    pub async fn enroll_students(
        &self,
        class_id: Uuid,
        student_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("enroll_students");
        let result = sqlx::query(
            r#"
            INSERT INTO class_enrollments (class_id, student_id)
            SELECT $1, student_id FROM UNNEST($2::uuid[]) AS t(student_id)
            ON CONFLICT (class_id, student_id) DO NOTHING
            "#,
        )
        .bind(class_id)
        .bind(student_ids)
        .execute(&self.pool)
        .await
        .map(|r| r.rows_affected());
        timer.record_result(&result);
        result
    }

    pub async fn list_students(
        &self,
        class_id: Uuid,
    ) -> Result<Vec<EnrolledStudentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_class_students");
        let result = sqlx::query_as::<_, EnrolledStudentEntity>(
            r#"
            SELECT u.id, u.email, u.display_name, u.roll_number, e.enrolled_at
            FROM class_enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.class_id = $1
            ORDER BY u.roll_number NULLS LAST, u.display_name
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn is_enrolled(&self, class_id: Uuid, student_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_student_enrolled");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM class_enrollments WHERE class_id = $1 AND student_id = $2
            )
            "#,
        )
        .bind(class_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

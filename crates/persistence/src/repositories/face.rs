//! Face descriptor repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{FaceDescriptorEntity, GalleryEntryEntity};
use crate::metrics::QueryTimer;

/// Repository for enrolled face descriptors.
#[derive(Clone)]
pub struct FaceDescriptorRepository {
    pool: PgPool,
}

impl FaceDescriptorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        student_id: Uuid,
        descriptor: &[f32],
    ) -> Result<FaceDescriptorEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_face_descriptor");
        let result = sqlx::query_as::<_, FaceDescriptorEntity>(
            r#"
            INSERT INTO face_descriptors (student_id, descriptor)
            VALUES ($1, $2)
            RETURNING id, student_id, descriptor, created_at
            "#,
        )
        .bind(student_id)
        .bind(descriptor)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn count_for_student(&self, student_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_face_descriptors");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM face_descriptors WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn delete_for_student(&self, student_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_face_descriptors");
        let result = sqlx::query("DELETE FROM face_descriptors WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected());
        timer.record_result(&result);
        result
    }

    /// Descriptors of every student enrolled in the class.
    pub async fn gallery_for_class(
        &self,
        class_id: Uuid,
    ) -> Result<Vec<GalleryEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("face_gallery_for_class");
        let result = sqlx::query_as::<_, GalleryEntryEntity>(
            r#"
            SELECT f.student_id, f.descriptor, f.created_at
            FROM face_descriptors f
            JOIN class_enrollments e ON e.student_id = f.student_id
            WHERE e.class_id = $1
            ORDER BY f.created_at, f.student_id
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

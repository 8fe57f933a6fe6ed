//! Subject and mark repositories.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MarkEntity, SubjectEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SubjectRepository {
    pool: PgPool,
}

impl SubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        class_id: Uuid,
        code: &str,
        name: &str,
        credits: i32,
    ) -> Result<SubjectEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_subject");
        let result = sqlx::query_as::<_, SubjectEntity>(
            r#"
            INSERT INTO subjects (class_id, code, name, credits)
            VALUES ($1, $2, $3, $4)
            RETURNING id, class_id, code, name, credits, created_at
            "#,
        )
        .bind(class_id)
        .bind(code)
        .bind(name)
        .bind(credits)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<SubjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_subject_by_id");
        let result = sqlx::query_as::<_, SubjectEntity>(
            "SELECT id, class_id, code, name, credits, created_at FROM subjects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn list_for_class(&self, class_id: Uuid) -> Result<Vec<SubjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_subjects_for_class");
        let result = sqlx::query_as::<_, SubjectEntity>(
            r#"
            SELECT id, class_id, code, name, credits, created_at
            FROM subjects WHERE class_id = $1
            ORDER BY code
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    /// Subjects of every class the student is enrolled in.
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<SubjectEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_subjects_for_student");
        let result = sqlx::query_as::<_, SubjectEntity>(
            r#"
            SELECT s.id, s.class_id, s.code, s.name, s.credits, s.created_at
            FROM subjects s
            JOIN class_enrollments e ON e.class_id = s.class_id
            WHERE e.student_id = $1
            ORDER BY s.code
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

#[derive(Clone)]
pub struct MarkRepository {
    pool: PgPool,
}

impl MarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or overwrites the mark for (student, subject, exam).
    pub async fn upsert(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
        exam: &str,
        score: f64,
        max_score: f64,
        recorded_by: Uuid,
    ) -> Result<MarkEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_mark");
        let result = sqlx::query_as::<_, MarkEntity>(
            r#"
            INSERT INTO marks (student_id, subject_id, exam, score, max_score, recorded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (student_id, subject_id, exam) DO UPDATE SET
                score = EXCLUDED.score,
                max_score = EXCLUDED.max_score,
                recorded_by = EXCLUDED.recorded_by,
                updated_at = NOW()
            RETURNING id, student_id, subject_id, exam, score, max_score, recorded_by,
                      created_at, updated_at
            "#,
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(exam)
        .bind(score)
        .bind(max_score)
        .bind(recorded_by)
        .fetch_one(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<MarkEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_marks_for_student");
        let result = sqlx::query_as::<_, MarkEntity>(
            r#"
            SELECT id, student_id, subject_id, exam, score, max_score, recorded_by,
                   created_at, updated_at
            FROM marks WHERE student_id = $1
            ORDER BY subject_id, exam
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await;
        timer.record_result(&result);
        result
    }
}

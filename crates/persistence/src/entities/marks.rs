//! Subject and mark entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Mark, Subject};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct SubjectEntity {
    pub id: Uuid,
    pub class_id: Uuid,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
}

impl From<SubjectEntity> for Subject {
    fn from(entity: SubjectEntity) -> Self {
        Self {
            id: entity.id,
            class_id: entity.class_id,
            code: entity.code,
            name: entity.name,
            credits: entity.credits,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MarkEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub exam: String,
    pub score: f64,
    pub max_score: f64,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MarkEntity> for Mark {
    fn from(entity: MarkEntity) -> Self {
        Self {
            id: entity.id,
            student_id: entity.student_id,
            subject_id: entity.subject_id,
            exam: entity.exam,
            score: entity.score,
            max_score: entity.max_score,
            recorded_by: entity.recorded_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

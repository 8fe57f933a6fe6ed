//! Class entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::class::EnrolledStudent;
use domain::models::Class;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the classes table.
#[derive(Debug, Clone, FromRow)]
pub struct ClassEntity {
    pub id: Uuid,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: f64,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClassEntity> for Class {
    fn from(entity: ClassEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            latitude: entity.latitude,
            longitude: entity.longitude,
            radius_meters: entity.radius_meters,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// A student row joined with its enrollment timestamp.
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudentEntity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub roll_number: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}

impl From<EnrolledStudentEntity> for EnrolledStudent {
    fn from(entity: EnrolledStudentEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            roll_number: entity.roll_number,
            enrolled_at: entity.enrolled_at,
        }
    }
}

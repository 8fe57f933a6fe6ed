//! Face descriptor entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{FaceDescriptor, GalleryEntry};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the face_descriptors table.
#[derive(Debug, Clone, FromRow)]
pub struct FaceDescriptorEntity {
    pub id: Uuid,
    pub student_id: Uuid,
    pub descriptor: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Gallery row for matching within a class.
#[derive(Debug, Clone, FromRow)]
pub struct GalleryEntryEntity {
    pub student_id: Uuid,
    pub descriptor: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryEntryEntity> for GalleryEntry {
    fn from(entity: GalleryEntryEntity) -> Self {
        Self {
            owner_id: entity.student_id,
            descriptor: FaceDescriptor::from_stored(entity.descriptor),
            enrolled_at: entity.created_at,
        }
    }
}

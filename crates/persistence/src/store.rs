//! PostgreSQL implementation of the attendance store.

use async_trait::async_trait;
use domain::models::attendance::{NewAttendanceRecord, NewAttendanceRequest};
use domain::models::{
    AttendanceRecord, AttendanceRequest, AttendanceRequestStatus, AttendanceStatus, Class,
    GalleryEntry, MarkedBy,
};
use domain::services::{AttendanceStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::{
    AttendanceRecordRepository, AttendanceRequestRepository, ClassRepository,
    FaceDescriptorRepository, NewRequestInput,
};

/// Attendance store backed by the repositories of this crate.
#[derive(Clone)]
pub struct PgAttendanceStore {
    classes: ClassRepository,
    faces: FaceDescriptorRepository,
    records: AttendanceRecordRepository,
    requests: AttendanceRequestRepository,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            classes: ClassRepository::new(pool.clone()),
            faces: FaceDescriptorRepository::new(pool.clone()),
            records: AttendanceRecordRepository::new(pool.clone()),
            requests: AttendanceRequestRepository::new(pool),
        }
    }
}

fn marker_id(marked_by: MarkedBy) -> Option<Uuid> {
    match marked_by {
        MarkedBy::Auto => None,
        MarkedBy::User(id) => Some(id),
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn find_class(&self, class_id: Uuid) -> Result<Option<Class>, StoreError> {
        Ok(self.classes.find_by_id(class_id).await?.map(Into::into))
    }

    async fn is_enrolled(&self, class_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.classes.is_enrolled(class_id, student_id).await?)
    }

    async fn class_gallery(&self, class_id: Uuid) -> Result<Vec<GalleryEntry>, StoreError> {
        let rows = self.faces.gallery_for_class(class_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn put_record(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<AttendanceRecord, StoreError> {
        let entity = self
            .records
            .upsert(
                record.student_id,
                record.class_id,
                record.attendance_date,
                record.status.into(),
                marker_id(record.marked_by),
            )
            .await?;
        Ok(entity.into())
    }

    async fn create_request(
        &self,
        request: NewAttendanceRequest,
    ) -> Result<AttendanceRequest, StoreError> {
        let entity = self
            .requests
            .create(NewRequestInput {
                student_id: request.student_id,
                class_id: request.class_id,
                attendance_date: request.attendance_date,
                latitude: request.latitude,
                longitude: request.longitude,
                geo_distance_meters: request.geo_distance_meters,
                face_distance: request.face_distance,
            })
            .await?;
        Ok(entity.into())
    }

    async fn find_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<AttendanceRequest>, StoreError> {
        Ok(self.requests.find_by_id(request_id).await?.map(Into::into))
    }

    async fn settle_request(
        &self,
        request_id: Uuid,
        decision: AttendanceRequestStatus,
        status: AttendanceStatus,
        reviewed_by: Uuid,
    ) -> Result<Option<(AttendanceRequest, AttendanceRecord)>, StoreError> {
        let settled = self
            .requests
            .settle(request_id, decision.into(), status.into(), reviewed_by)
            .await?;
        Ok(settled.map(|(request, record)| (request.into(), record.into())))
    }
}

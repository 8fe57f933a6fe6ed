//! Attendance resolution: combines the geofence and face signals into an
//! immediate record or a pending request, and settles pending requests.

use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::attendance_store::{AttendanceStore, StoreError};
use super::face_matcher::{FaceMatcher, DEFAULT_MATCH_THRESHOLD};
use super::geofence::{self, Coordinate, GeofenceCheck};
use crate::models::attendance::{NewAttendanceRecord, NewAttendanceRequest};
use crate::models::{
    AttendanceRecord, AttendanceRequest, AttendanceRequestStatus, AttendanceStatus,
    FaceDescriptor, MarkedBy,
};

/// Tunables applied to every submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendancePolicy {
    pub face_match_threshold: f64,
    /// When false, submissions without a face fall back to geofence-only.
    pub require_face: bool,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            face_match_threshold: DEFAULT_MATCH_THRESHOLD,
            require_face: true,
        }
    }
}

/// Face signal accompanying a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceEvidence {
    NotProvided,
    /// An image was supplied but the encoder found no face in it.
    NotDetected,
    Descriptor(FaceDescriptor),
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub class_id: Uuid,
    /// The student the submitter claims to be. `None` identifies by face.
    pub claimed_student: Option<Uuid>,
    pub coordinate: Coordinate,
    pub face: FaceEvidence,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Present {
        record: AttendanceRecord,
        geo: GeofenceCheck,
        face_distance: Option<f64>,
    },
    Pending {
        request: AttendanceRequest,
    },
}

impl Resolution {
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Present { .. } => "present",
            Resolution::Pending { .. } => "pending",
        }
    }
}

/// Reviewer decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn request_status(self) -> AttendanceRequestStatus {
        match self {
            ReviewDecision::Approve => AttendanceRequestStatus::Approved,
            ReviewDecision::Reject => AttendanceRequestStatus::Rejected,
        }
    }

    fn record_status(self) -> AttendanceStatus {
        match self {
            ReviewDecision::Approve => AttendanceStatus::Present,
            ReviewDecision::Reject => AttendanceStatus::Absent,
        }
    }
}

/// Per-request failures. Only `Store` is an infrastructure fault.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("{0}")]
    Validation(String),

    #[error("Class not found")]
    ClassNotFound,

    #[error("Class has no registered location")]
    ClassLocationMissing,

    #[error("No face detected in the image")]
    NoFaceDetected,

    #[error("Face not recognized")]
    NotRecognized,

    #[error("Student is not enrolled in this class")]
    NotEnrolled,

    #[error("Attendance request not found")]
    RequestNotFound,

    #[error("Attendance request has already been resolved")]
    RequestAlreadyResolved,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolutionError {
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolutionError::Validation(_) => "invalid",
            ResolutionError::ClassNotFound => "class_not_found",
            ResolutionError::ClassLocationMissing => "class_location_missing",
            ResolutionError::NoFaceDetected => "no_face_detected",
            ResolutionError::NotRecognized => "face_not_recognized",
            ResolutionError::NotEnrolled => "not_enrolled",
            ResolutionError::RequestNotFound => "request_not_found",
            ResolutionError::RequestAlreadyResolved => "already_resolved",
            ResolutionError::Store(_) => "error",
        }
    }
}

/// Resolves submissions against an injected store and matcher.
#[derive(Clone)]
pub struct AttendanceResolver {
    store: Arc<dyn AttendanceStore>,
    matcher: Arc<dyn FaceMatcher>,
    policy: AttendancePolicy,
}

impl AttendanceResolver {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        matcher: Arc<dyn FaceMatcher>,
        policy: AttendancePolicy,
    ) -> Self {
        Self {
            store,
            matcher,
            policy,
        }
    }

    pub fn policy(&self) -> &AttendancePolicy {
        &self.policy
    }

    /// Resolves a submission to an immediate record or a pending request.
    /// Failures write nothing.
    pub async fn resolve(&self, submission: Submission) -> Result<Resolution, ResolutionError> {
        let class = self
            .store
            .find_class(submission.class_id)
            .await?
            .ok_or(ResolutionError::ClassNotFound)?;
        let location = class
            .location()
            .ok_or(ResolutionError::ClassLocationMissing)?;

        if let Some(claimed) = submission.claimed_student {
            if !self.store.is_enrolled(class.id, claimed).await? {
                return Err(ResolutionError::NotEnrolled);
            }
        }

        let (student_id, face_distance) = match &submission.face {
            FaceEvidence::NotDetected => return Err(ResolutionError::NoFaceDetected),
            FaceEvidence::NotProvided if self.policy.require_face => {
                return Err(ResolutionError::Validation(
                    "A face descriptor or image is required".to_string(),
                ));
            }
            FaceEvidence::NotProvided => {
                let student_id = submission.claimed_student.ok_or_else(|| {
                    ResolutionError::Validation(
                        "A student identity is required without a face".to_string(),
                    )
                })?;
                (student_id, None)
            }
            FaceEvidence::Descriptor(probe) => {
                let gallery = self.store.class_gallery(class.id).await?;
                let matched = self
                    .matcher
                    .match_face(probe, &gallery, self.policy.face_match_threshold)
                    .ok_or(ResolutionError::NotRecognized)?;
                if submission
                    .claimed_student
                    .is_some_and(|claimed| claimed != matched.owner_id)
                {
                    debug!(
                        class_id = %class.id,
                        matched_owner = %matched.owner_id,
                        "Face matched a different student than claimed"
                    );
                    return Err(ResolutionError::NotRecognized);
                }
                (matched.owner_id, Some(matched.distance))
            }
        };

        let geo = geofence::evaluate(submission.coordinate, &location);

        if geo.inside {
            let record = self
                .store
                .put_record(NewAttendanceRecord {
                    student_id,
                    class_id: class.id,
                    attendance_date: submission.date,
                    status: AttendanceStatus::Present,
                    marked_by: MarkedBy::Auto,
                })
                .await?;
            info!(
                student_id = %student_id,
                class_id = %class.id,
                distance_meters = geo.distance_meters,
                "Attendance marked present"
            );
            Ok(Resolution::Present {
                record,
                geo,
                face_distance,
            })
        } else {
            let request = self
                .store
                .create_request(NewAttendanceRequest {
                    student_id,
                    class_id: class.id,
                    attendance_date: submission.date,
                    latitude: submission.coordinate.latitude,
                    longitude: submission.coordinate.longitude,
                    geo_distance_meters: geo.distance_meters,
                    face_distance,
                })
                .await?;
            info!(
                student_id = %student_id,
                class_id = %class.id,
                request_id = %request.id,
                distance_meters = geo.distance_meters,
                radius_meters = location.radius_meters,
                "Attendance outside geofence, request opened"
            );
            Ok(Resolution::Pending { request })
        }
    }

    /// Settles a pending request exactly once.
    pub async fn review(
        &self,
        request_id: Uuid,
        decision: ReviewDecision,
        reviewer_id: Uuid,
    ) -> Result<(AttendanceRequest, AttendanceRecord), ResolutionError> {
        let settled = self
            .store
            .settle_request(
                request_id,
                decision.request_status(),
                decision.record_status(),
                reviewer_id,
            )
            .await?;

        match settled {
            Some((request, record)) => {
                info!(
                    request_id = %request.id,
                    reviewer_id = %reviewer_id,
                    status = %request.status,
                    "Attendance request settled"
                );
                Ok((request, record))
            }
            None => match self.store.find_request(request_id).await? {
                Some(_) => Err(ResolutionError::RequestAlreadyResolved),
                None => Err(ResolutionError::RequestNotFound),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Class, GalleryEntry};
    use crate::services::attendance_store::memory::InMemoryAttendanceStore;
    use crate::services::face_matcher::EuclideanMatcher;
    use chrono::Utc;

    struct Fixture {
        store: Arc<InMemoryAttendanceStore>,
        resolver: AttendanceResolver,
        class_id: Uuid,
        student_id: Uuid,
        other_student: Uuid,
    }

    fn descriptor(values: &[f32]) -> FaceDescriptor {
        FaceDescriptor::from_stored(values.to_vec())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    async fn fixture(policy: AttendancePolicy, with_location: bool) -> Fixture {
        let store = Arc::new(InMemoryAttendanceStore::default());
        let class_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let other_student = Uuid::new_v4();

        store
            .add_class(Class {
                id: class_id,
                name: "Physics".to_string(),
                latitude: with_location.then_some(0.0),
                longitude: with_location.then_some(0.0),
                radius_meters: 50.0,
                created_by: Uuid::new_v4(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;

        for (owner, values) in [(student_id, [0.0f32, 0.0]), (other_student, [1.0, 1.0])] {
            store.enroll(class_id, owner).await;
            store
                .add_descriptor(GalleryEntry {
                    owner_id: owner,
                    descriptor: descriptor(&values),
                    enrolled_at: Utc::now(),
                })
                .await;
        }

        let resolver = AttendanceResolver::new(store.clone(), Arc::new(EuclideanMatcher), policy);
        Fixture {
            store,
            resolver,
            class_id,
            student_id,
            other_student,
        }
    }

    /// A coordinate roughly `meters` north of the class center.
    fn north_of_center(meters: f64) -> Coordinate {
        let degrees = (meters / geofence::EARTH_RADIUS_METERS).to_degrees();
        Coordinate::new(degrees, 0.0).unwrap()
    }

    fn submission(f: &Fixture, meters: f64, face: FaceEvidence) -> Submission {
        Submission {
            class_id: f.class_id,
            claimed_student: Some(f.student_id),
            coordinate: north_of_center(meters),
            face,
            date: date(),
        }
    }

    #[tokio::test]
    async fn test_match_inside_geofence_is_present_auto() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.3, 0.0]));

        let resolution = f.resolver.resolve(submission(&f, 10.0, face)).await.unwrap();
        match resolution {
            Resolution::Present {
                record,
                geo,
                face_distance,
            } => {
                assert_eq!(record.student_id, f.student_id);
                assert_eq!(record.status, AttendanceStatus::Present);
                assert_eq!(record.marked_by, MarkedBy::Auto);
                assert!(geo.inside);
                assert!((geo.distance_meters - 10.0).abs() < 0.01);
                assert!((face_distance.unwrap() - 0.3).abs() < 1e-6);
            }
            other => panic!("expected present, got {:?}", other),
        }
        assert_eq!(f.store.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_match_outside_geofence_opens_request() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.3, 0.0]));

        let resolution = f.resolver.resolve(submission(&f, 80.0, face)).await.unwrap();
        let Resolution::Pending { request } = resolution else {
            panic!("expected pending");
        };
        assert_eq!(request.status, AttendanceRequestStatus::Pending);
        assert_eq!(request.student_id, f.student_id);
        assert!((request.geo_distance_meters - 80.0).abs() < 0.01);
        assert!(f.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_repeat_outside_submission_keeps_one_pending_request() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.3, 0.0]));

        let Resolution::Pending { request: first } = f
            .resolver
            .resolve(submission(&f, 80.0, face.clone()))
            .await
            .unwrap()
        else {
            panic!("expected pending");
        };
        let Resolution::Pending { request: second } =
            f.resolver.resolve(submission(&f, 120.0, face)).await.unwrap()
        else {
            panic!("expected pending");
        };

        assert_eq!(first.id, second.id);
        assert!((second.geo_distance_meters - 120.0).abs() < 0.01);
        assert_eq!(f.store.request_count().await, 1);

        let reviewer = Uuid::new_v4();
        f.resolver
            .review(first.id, ReviewDecision::Approve, reviewer)
            .await
            .unwrap();
        let again = f
            .resolver
            .review(second.id, ReviewDecision::Reject, reviewer)
            .await;
        assert!(matches!(again, Err(ResolutionError::RequestAlreadyResolved)));
        let records = f.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_approve_marks_present_once() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.3, 0.0]));
        let Resolution::Pending { request } =
            f.resolver.resolve(submission(&f, 80.0, face)).await.unwrap()
        else {
            panic!("expected pending");
        };

        let reviewer = Uuid::new_v4();
        let (settled, record) = f
            .resolver
            .review(request.id, ReviewDecision::Approve, reviewer)
            .await
            .unwrap();
        assert_eq!(settled.status, AttendanceRequestStatus::Approved);
        assert_eq!(settled.reviewed_by, Some(reviewer));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.marked_by, MarkedBy::User(reviewer));

        let again = f
            .resolver
            .review(request.id, ReviewDecision::Approve, reviewer)
            .await;
        assert!(matches!(again, Err(ResolutionError::RequestAlreadyResolved)));
        assert_eq!(f.store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_reject_marks_absent_and_is_terminal() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.3, 0.0]));
        let Resolution::Pending { request } =
            f.resolver.resolve(submission(&f, 80.0, face)).await.unwrap()
        else {
            panic!("expected pending");
        };

        let reviewer = Uuid::new_v4();
        let (settled, record) = f
            .resolver
            .review(request.id, ReviewDecision::Reject, reviewer)
            .await
            .unwrap();
        assert_eq!(settled.status, AttendanceRequestStatus::Rejected);
        assert_eq!(record.status, AttendanceStatus::Absent);

        let approve_after = f
            .resolver
            .review(request.id, ReviewDecision::Approve, reviewer)
            .await;
        assert!(matches!(
            approve_after,
            Err(ResolutionError::RequestAlreadyResolved)
        ));
        let records = f.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn test_review_unknown_request() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let result = f
            .resolver
            .review(Uuid::new_v4(), ReviewDecision::Approve, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ResolutionError::RequestNotFound)));
    }

    #[tokio::test]
    async fn test_unrecognized_face_writes_nothing() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[5.0, -5.0]));

        let result = f.resolver.resolve(submission(&f, 10.0, face)).await;
        assert!(matches!(result, Err(ResolutionError::NotRecognized)));
        assert!(f.store.records().await.is_empty());
        assert_eq!(f.store.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_face_of_another_student_is_not_recognized() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[1.0, 1.0]));

        let result = f.resolver.resolve(submission(&f, 10.0, face)).await;
        assert!(matches!(result, Err(ResolutionError::NotRecognized)));
    }

    #[tokio::test]
    async fn test_kiosk_submission_identifies_by_face() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let mut s = submission(&f, 5.0, FaceEvidence::Descriptor(descriptor(&[0.9, 1.0])));
        s.claimed_student = None;

        let Resolution::Present { record, .. } = f.resolver.resolve(s).await.unwrap() else {
            panic!("expected present");
        };
        assert_eq!(record.student_id, f.other_student);
    }

    #[tokio::test]
    async fn test_no_face_detected_is_distinct() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let result = f
            .resolver
            .resolve(submission(&f, 10.0, FaceEvidence::NotDetected))
            .await;
        assert!(matches!(result, Err(ResolutionError::NoFaceDetected)));
    }

    #[tokio::test]
    async fn test_missing_face_is_rejected_when_required() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let result = f
            .resolver
            .resolve(submission(&f, 10.0, FaceEvidence::NotProvided))
            .await;
        assert!(matches!(result, Err(ResolutionError::Validation(_))));
        assert!(f.store.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_geofence_only_policy() {
        let policy = AttendancePolicy {
            require_face: false,
            ..Default::default()
        };
        let f = fixture(policy, true).await;

        let inside = f
            .resolver
            .resolve(submission(&f, 10.0, FaceEvidence::NotProvided))
            .await
            .unwrap();
        let Resolution::Present { face_distance, .. } = inside else {
            panic!("expected present");
        };
        assert!(face_distance.is_none());

        let outside = f
            .resolver
            .resolve(submission(&f, 80.0, FaceEvidence::NotProvided))
            .await
            .unwrap();
        let Resolution::Pending { request } = outside else {
            panic!("expected pending");
        };
        assert!(request.face_distance.is_none());
    }

    #[tokio::test]
    async fn test_missing_class_location() {
        let f = fixture(AttendancePolicy::default(), false).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.0, 0.0]));
        let result = f.resolver.resolve(submission(&f, 0.0, face)).await;
        assert!(matches!(result, Err(ResolutionError::ClassLocationMissing)));
    }

    #[tokio::test]
    async fn test_unknown_class_and_unenrolled_student() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.0, 0.0]));

        let mut unknown = submission(&f, 0.0, face.clone());
        unknown.class_id = Uuid::new_v4();
        assert!(matches!(
            f.resolver.resolve(unknown).await,
            Err(ResolutionError::ClassNotFound)
        ));

        let mut stranger = submission(&f, 0.0, face);
        stranger.claimed_student = Some(Uuid::new_v4());
        assert!(matches!(
            f.resolver.resolve(stranger).await,
            Err(ResolutionError::NotEnrolled)
        ));
    }

    #[tokio::test]
    async fn test_resubmission_overwrites_single_record() {
        let f = fixture(AttendancePolicy::default(), true).await;
        let face = FaceEvidence::Descriptor(descriptor(&[0.1, 0.0]));

        let Resolution::Pending { request } = f
            .resolver
            .resolve(submission(&f, 80.0, face.clone()))
            .await
            .unwrap()
        else {
            panic!("expected pending");
        };
        f.resolver
            .review(request.id, ReviewDecision::Reject, Uuid::new_v4())
            .await
            .unwrap();

        let Resolution::Present { record, .. } =
            f.resolver.resolve(submission(&f, 10.0, face)).await.unwrap()
        else {
            panic!("expected present");
        };

        let records = f.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert_eq!(records[0].marked_by, MarkedBy::Auto);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ResolutionError::NotRecognized.outcome(), "face_not_recognized");
        assert_eq!(ResolutionError::NoFaceDetected.outcome(), "no_face_detected");
    }
}

//! Nearest-neighbour face matching over an enrolled gallery.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::warn;
use uuid::Uuid;

use crate::models::{FaceDescriptor, GalleryEntry};

/// Match distance accepted by the reference recognition model.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.55;

/// The nearest enrolled owner and its distance to the probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceMatch {
    pub owner_id: Uuid,
    pub distance: f64,
}

/// Finds the enrolled owner closest to a probe descriptor.
pub trait FaceMatcher: Send + Sync {
    /// Returns the nearest entry regardless of threshold.
    fn nearest(&self, probe: &FaceDescriptor, gallery: &[GalleryEntry]) -> Option<FaceMatch>;

    /// Returns the nearest entry only when its distance is within `threshold`.
    fn match_face(
        &self,
        probe: &FaceDescriptor,
        gallery: &[GalleryEntry],
        threshold: f64,
    ) -> Option<FaceMatch> {
        self.nearest(probe, gallery)
            .filter(|m| m.distance <= threshold)
    }
}

/// Linear scan by Euclidean distance.
///
/// Equidistant entries are ordered by earliest `enrolled_at`, then by the
/// smallest owner id. Entries whose length differs from the probe are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanMatcher;

impl FaceMatcher for EuclideanMatcher {
    fn nearest(&self, probe: &FaceDescriptor, gallery: &[GalleryEntry]) -> Option<FaceMatch> {
        let mut best: Option<(f64, &GalleryEntry)> = None;

        for entry in gallery {
            let Some(distance) = probe.euclidean_distance(&entry.descriptor) else {
                warn!(
                    owner_id = %entry.owner_id,
                    expected = probe.len(),
                    actual = entry.descriptor.len(),
                    "Skipping gallery entry with mismatched descriptor length"
                );
                continue;
            };

            let better = match best {
                None => true,
                Some((best_distance, best_entry)) => match distance.total_cmp(&best_distance) {
                    Ordering::Less => true,
                    Ordering::Greater => false,
                    Ordering::Equal => {
                        (entry.enrolled_at, entry.owner_id)
                            < (best_entry.enrolled_at, best_entry.owner_id)
                    }
                },
            };
            if better {
                best = Some((distance, entry));
            }
        }

        best.map(|(distance, entry)| FaceMatch {
            owner_id: entry.owner_id,
            distance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(owner_id: Uuid, values: Vec<f32>, age_secs: i64) -> GalleryEntry {
        GalleryEntry {
            owner_id,
            descriptor: FaceDescriptor::from_stored(values),
            enrolled_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn test_exact_descriptor_matches_with_zero_distance() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let gallery = vec![
            entry(alice, vec![0.1, 0.2, 0.3], 10),
            entry(bob, vec![0.9, 0.8, 0.7], 10),
        ];
        let probe = FaceDescriptor::from_stored(vec![0.1, 0.2, 0.3]);

        let m = EuclideanMatcher
            .match_face(&probe, &gallery, DEFAULT_MATCH_THRESHOLD)
            .unwrap();
        assert_eq!(m.owner_id, alice);
        assert_eq!(m.distance, 0.0);
    }

    #[test]
    fn test_empty_gallery_has_no_match() {
        let probe = FaceDescriptor::from_stored(vec![0.1, 0.2]);
        assert!(EuclideanMatcher.nearest(&probe, &[]).is_none());
        assert!(EuclideanMatcher
            .match_face(&probe, &[], DEFAULT_MATCH_THRESHOLD)
            .is_none());
    }

    #[test]
    fn test_threshold_is_inclusive_and_rejects_far_matches() {
        let owner = Uuid::new_v4();
        let gallery = vec![entry(owner, vec![0.0, 0.0], 0)];

        let near = FaceDescriptor::from_stored(vec![0.5, 0.0]);
        assert!(EuclideanMatcher.match_face(&near, &gallery, 0.5).is_some());

        let far = FaceDescriptor::from_stored(vec![0.6, 0.0]);
        let nearest = EuclideanMatcher.nearest(&far, &gallery).unwrap();
        assert_eq!(nearest.owner_id, owner);
        assert!(EuclideanMatcher
            .match_face(&far, &gallery, DEFAULT_MATCH_THRESHOLD)
            .is_none());
    }

    #[test]
    fn test_picks_nearest_across_multiple_descriptors_per_owner() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let gallery = vec![
            entry(alice, vec![1.0, 1.0], 30),
            entry(bob, vec![0.4, 0.0], 20),
            entry(alice, vec![0.1, 0.0], 10),
        ];
        let probe = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        let m = EuclideanMatcher.nearest(&probe, &gallery).unwrap();
        assert_eq!(m.owner_id, alice);
        assert!((m.distance - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_ties_prefer_earliest_enrollment() {
        let early = Uuid::new_v4();
        let late = Uuid::new_v4();
        let gallery = vec![
            entry(late, vec![1.0, 0.0], 10),
            entry(early, vec![-1.0, 0.0], 100),
        ];
        let probe = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        assert_eq!(EuclideanMatcher.nearest(&probe, &gallery).unwrap().owner_id, early);
    }

    #[test]
    fn test_ties_with_same_enrollment_prefer_smallest_owner() {
        let enrolled_at = Utc::now();
        let mut owners = [Uuid::new_v4(), Uuid::new_v4()];
        owners.sort();
        let gallery = vec![
            GalleryEntry {
                owner_id: owners[1],
                descriptor: FaceDescriptor::from_stored(vec![0.0, 1.0]),
                enrolled_at,
            },
            GalleryEntry {
                owner_id: owners[0],
                descriptor: FaceDescriptor::from_stored(vec![0.0, -1.0]),
                enrolled_at,
            },
        ];
        let probe = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        assert_eq!(
            EuclideanMatcher.nearest(&probe, &gallery).unwrap().owner_id,
            owners[0]
        );
    }

    #[test]
    fn test_mismatched_lengths_are_skipped() {
        let good = Uuid::new_v4();
        let gallery = vec![
            entry(Uuid::new_v4(), vec![0.0, 0.0, 0.0], 0),
            entry(good, vec![0.2, 0.0], 0),
        ];
        let probe = FaceDescriptor::from_stored(vec![0.0, 0.0]);
        assert_eq!(EuclideanMatcher.nearest(&probe, &gallery).unwrap().owner_id, good);
    }
}

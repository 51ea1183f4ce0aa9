use crate::distance::{euclidean, is_valid_descriptor};
use crate::error::FaceIdError;
use crate::types::{Match, SnapshotEntry};

/// Resolve a probe vector against a snapshot of stored descriptors.
///
/// Scans every entry, tracks the minimum Euclidean distance and accepts the
/// winner iff that distance is at most `threshold`. Returns `Ok(None)` when
/// the snapshot is empty or nothing is close enough — that is a normal
/// outcome, not an error.
///
/// Exact distance ties are broken deterministically: the lexicographically
/// smaller descriptor id wins, then the smaller person id.
///
/// O(N·D) for N stored descriptors of length D. The linear scan is
/// intentional; enrolled populations are small.
pub fn identify(
    probe: &[f32],
    threshold: f32,
    snapshot: &[SnapshotEntry],
) -> Result<Option<Match>, FaceIdError> {
    if !is_valid_descriptor(probe) {
        return Err(FaceIdError::Validation(format!(
            "probe must be a finite vector of length 128 or 256, got length {}",
            probe.len()
        )));
    }
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(FaceIdError::Validation(format!(
            "threshold must be finite and non-negative, got {threshold}"
        )));
    }

    let mut best: Option<(&SnapshotEntry, f32)> = None;
    for entry in snapshot {
        if entry.vector.len() != probe.len() {
            return Err(FaceIdError::DimensionMismatch {
                expected: probe.len(),
                got: entry.vector.len(),
            });
        }

        let dist = euclidean(probe, &entry.vector);
        let closer = match best {
            None => true,
            Some((cur, cur_dist)) => {
                dist < cur_dist
                    || (dist == cur_dist
                        && (entry.descriptor_id.as_str(), entry.person_id.as_str())
                            < (cur.descriptor_id.as_str(), cur.person_id.as_str()))
            }
        };
        if closer {
            best = Some((entry, dist));
        }
    }

    match best {
        Some((entry, dist)) if dist <= threshold => Ok(Some(Match {
            person_id: entry.person_id.clone(),
            descriptor_id: entry.descriptor_id.clone(),
            distance: dist,
            confidence: confidence(dist, threshold),
        })),
        _ => Ok(None),
    }
}

/// Display score in [0, 1], monotonically decreasing in distance.
/// A zero threshold only ever accepts exact matches, so that corner is 1.
fn confidence(distance: f32, threshold: f32) -> f32 {
    if threshold == 0.0 {
        return 1.0;
    }
    (1.0 - distance / threshold).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(person_id: &str, descriptor_id: &str, vector: Vec<f32>) -> SnapshotEntry {
        SnapshotEntry {
            person_id: person_id.into(),
            descriptor_id: descriptor_id.into(),
            vector,
        }
    }

    fn unit(dim: usize, index: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[index] = 1.0;
        v
    }

    #[test]
    fn empty_snapshot_is_no_match() {
        for threshold in [0.0, 0.5, 100.0] {
            let hit = identify(&vec![0.0; 128], threshold, &[]).unwrap();
            assert!(hit.is_none());
        }
    }

    #[test]
    fn exact_match_at_any_threshold() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];
        for threshold in [0.0, 0.5, 2.0] {
            let hit = identify(&vec![0.0; 128], threshold, &snapshot)
                .unwrap()
                .expect("should match");
            assert_eq!(hit.person_id, "a");
            assert_eq!(hit.descriptor_id, "d1");
            assert_eq!(hit.distance, 0.0);
        }
    }

    // Person A enrolled with the all-zero 128-vector. A unit probe sits at
    // distance exactly 1.0: rejected at threshold 0.5, accepted at 1.5.
    #[test]
    fn threshold_accepts_and_rejects() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];

        let hit = identify(&vec![0.0; 128], 0.5, &snapshot).unwrap();
        assert_eq!(hit.unwrap().distance, 0.0);

        let probe = unit(128, 0);
        assert!(identify(&probe, 0.5, &snapshot).unwrap().is_none());

        let hit = identify(&probe, 1.5, &snapshot).unwrap().expect("should match");
        assert_eq!(hit.person_id, "a");
        assert_eq!(hit.distance, 1.0);
    }

    #[test]
    fn distance_equal_to_threshold_is_accepted() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];
        let hit = identify(&unit(128, 0), 1.0, &snapshot).unwrap();
        assert_eq!(hit.unwrap().distance, 1.0);
    }

    #[test]
    fn closest_descriptor_wins() {
        let mut near = vec![0.0; 128];
        near[0] = 0.1;
        let snapshot = [
            entry("far", "d1", unit(128, 1)),
            entry("near", "d2", near),
        ];
        let hit = identify(&vec![0.0; 128], 2.0, &snapshot).unwrap().unwrap();
        assert_eq!(hit.person_id, "near");
    }

    #[test]
    fn tie_prefers_smaller_descriptor_id() {
        // Same vector for both entries: distances are exactly equal. The
        // smaller descriptor id wins even though its person id is larger.
        let snapshot = [
            entry("alice", "b-desc", unit(128, 0)),
            entry("zed", "a-desc", unit(128, 0)),
        ];
        let hit = identify(&vec![0.0; 128], 2.0, &snapshot).unwrap().unwrap();
        assert_eq!(hit.descriptor_id, "a-desc");
        assert_eq!(hit.person_id, "zed");
    }

    #[test]
    fn tie_falls_back_to_smaller_person_id() {
        let snapshot = [
            entry("beta", "dup", unit(128, 0)),
            entry("alpha", "dup", unit(128, 0)),
        ];
        let hit = identify(&vec![0.0; 128], 2.0, &snapshot).unwrap().unwrap();
        assert_eq!(hit.person_id, "alpha");
    }

    #[test]
    fn mixed_lengths_are_an_error() {
        let snapshot = [entry("a", "d1", vec![0.0; 256])];
        let err = identify(&vec![0.0; 128], 0.5, &snapshot).unwrap_err();
        match err {
            FaceIdError::DimensionMismatch { expected, got } => {
                assert_eq!(expected, 128);
                assert_eq!(got, 256);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn invalid_probe_is_rejected() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];
        assert!(matches!(
            identify(&vec![0.0; 127], 0.5, &snapshot),
            Err(FaceIdError::Validation(_))
        ));

        let mut probe = vec![0.0; 128];
        probe[3] = f32::NAN;
        assert!(matches!(
            identify(&probe, 0.5, &snapshot),
            Err(FaceIdError::Validation(_))
        ));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];
        for bad in [-0.1, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                identify(&vec![0.0; 128], bad, &snapshot),
                Err(FaceIdError::Validation(_))
            ));
        }
    }

    #[test]
    fn confidence_decreases_with_distance() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];

        let close = identify(&vec![0.0; 128], 2.0, &snapshot).unwrap().unwrap();
        assert_eq!(close.confidence, 1.0);

        let farther = identify(&unit(128, 0), 2.0, &snapshot).unwrap().unwrap();
        assert!((farther.confidence - 0.5).abs() < 1e-6);
        assert!(farther.confidence < close.confidence);
    }

    #[test]
    fn confidence_at_zero_threshold_exact_match() {
        let snapshot = [entry("a", "d1", vec![0.0; 128])];
        let hit = identify(&vec![0.0; 128], 0.0, &snapshot).unwrap().unwrap();
        assert_eq!(hit.confidence, 1.0);
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use super::BroadPhase;
use crate::{Aabb, CollisionPair, Detection, GeomError};

/// The `O(n^2)` all-pairs detector.
///
/// Why this exists:
/// - Correctness oracle for the spatial hash (identical pair sets).
/// - The "before" arm of every benchmark.
///
/// Complexity: exactly `n(n-1)/2` rectangle tests regardless of layout.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaiveDetector;

impl BroadPhase for NaiveDetector {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn detect(&self, aabbs: &[Aabb]) -> Result<Detection, GeomError> {
        Ok(detect_naive_counted(aabbs))
    }
}

/// Returns every overlapping pair, sorted by `(index1, index2)`.
pub fn detect_naive(aabbs: &[Aabb]) -> Vec<CollisionPair> {
    detect_naive_counted(aabbs).pairs
}

/// Like [`detect_naive`] but also reports how many tests ran.
pub fn detect_naive_counted(aabbs: &[Aabb]) -> Detection {
    let mut out = Detection::default();
    for (i, a) in aabbs.iter().enumerate() {
        for (j, b) in aabbs.iter().enumerate().skip(i + 1) {
            out.checks += 1;
            if a.overlaps(b) {
                // canonical since i < j; emitted in sorted order
                out.pairs.extend(CollisionPair::new(i, j));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bb(x: f64, y: f64, w: f64, h: f64) -> Aabb {
        Aabb::new(x, y, w, h).unwrap()
    }

    #[test]
    fn empty_and_single_inputs_have_no_pairs() {
        assert!(detect_naive(&[]).is_empty());
        assert!(detect_naive(&[bb(0.0, 0.0, 5.0, 5.0)]).is_empty());
    }

    #[test]
    fn check_count_is_triangular() {
        let boxes: Vec<Aabb> = (0..7).map(|i| bb(f64::from(i) * 100.0, 0.0, 1.0, 1.0)).collect();
        let d = detect_naive_counted(&boxes);
        assert_eq!(d.checks, 21);
        assert!(d.pairs.is_empty());
    }

    #[test]
    fn stacked_boxes_pair_with_everyone() {
        let boxes = vec![bb(0.0, 0.0, 4.0, 4.0); 4];
        let flat: Vec<_> = detect_naive(&boxes)
            .iter()
            .map(|p| (p.index1(), p.index2()))
            .collect();
        assert_eq!(flat, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }
}

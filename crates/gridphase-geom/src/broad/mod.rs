// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces and the two detectors used by the engine.
//!
//! Determinism contract (applies to every implementation):
//! - Pair identity is canonicalized as `(min_index, max_index)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is strict on every edge (touching rectangles do not collide).
//!
//! [`naive::NaiveDetector`] is the `O(n^2)` all-pairs oracle.
//! [`spatial_hash::SpatialHashDetector`] prunes candidates through a uniform
//! grid and must report exactly the same pairs.

#[doc = "Reference all-pairs detector."]
pub mod naive;
#[doc = "Uniform-grid spatial hash detector."]
pub mod spatial_hash;

use crate::{Aabb, Detection, GeomError};

/// A detector that turns a slice of rectangles into overlapping pairs.
///
/// Pair indices refer to positions in `aabbs`. Implementations must return
/// pairs sorted ascending with `index1 < index2` and no duplicates.
pub trait BroadPhase {
    /// Short human-readable label, used in logs and benchmark output.
    fn name(&self) -> &'static str;

    /// Detects every overlapping pair in `aabbs`.
    ///
    /// # Errors
    /// Implementations return a [`GeomError`] when their configuration is
    /// invalid; detection itself is infallible.
    fn detect(&self, aabbs: &[Aabb]) -> Result<Detection, GeomError>;
}

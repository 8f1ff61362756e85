// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"2D geometry and broad-phase collision detection for gridphase.

This crate provides:
- Axis-aligned rectangles (`Aabb`) and the physics objects built on them.
- Canonical collision pairs (`CollisionPair`) and detector output (`Detection`).
- A reference `O(n^2)` detector and a uniform spatial-hash detector that
  report identical pair sets.
- A seeded PRNG and test-set generator with a fixed shape distribution.

Design notes:
- Deterministic: no ambient RNG; pair output is sorted by `(index1, index2)`.
- Overlap is strict on every axis, so rectangles that only share an edge do
  not collide.
- Validation happens at the API boundary; degenerate configuration is an
  error, never a silently empty result.
"]

/// Broad-phase detectors and the trait they share.
pub mod broad;
mod error;
/// Seeded random test-set generation.
pub mod generate;
/// Deterministic pseudo-random numbers.
pub mod prng;
/// Foundational geometric types.
pub mod types;

pub use broad::naive::{detect_naive, detect_naive_counted, NaiveDetector};
pub use broad::spatial_hash::{
    detect_spatial, detect_spatial_counted, GridStats, SpatialHashConfig, SpatialHashDetector,
    SpatialHashGrid,
};
pub use broad::BroadPhase;
pub use error::GeomError;
pub use generate::ShapeDistribution;
pub use prng::Prng;
pub use types::aabb::Aabb;
pub use types::object::{ObjectId, PhysicsObject};
pub use types::pair::{CollisionPair, Detection};

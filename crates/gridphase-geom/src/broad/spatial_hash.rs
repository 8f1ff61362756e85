// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::BroadPhase;
use crate::{Aabb, CollisionPair, Detection, GeomError};

/// Cell coordinate in the uniform grid.
type Cell = (i64, i64);

/// Tuning knobs for the spatial hash.
///
/// `max_objects_per_cell` is a sizing hint: each bucket is preallocated with
/// that capacity. It is *not* a cap. A bucket that receives more objects
/// simply grows, so no candidate is ever dropped and the pair set always
/// matches the naive detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialHashConfig {
    /// When `false`, callers that own a detector choice (the loop driver)
    /// fall back to the naive detector. [`detect_spatial`] ignores it.
    pub enabled: bool,
    /// Side length of a square cell, in arena units.
    pub cell_size: f64,
    /// Initial capacity of each bucket.
    pub max_objects_per_cell: usize,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cell_size: 50.0,
            max_objects_per_cell: 8,
        }
    }
}

impl SpatialHashConfig {
    /// Builds an enabled config with the given cell size and default bucket hint.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidCellSize`] for non-positive or non-finite sizes.
    pub fn with_cell_size(cell_size: f64) -> Result<Self, GeomError> {
        let cfg = Self {
            cell_size,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks the invariants `cell_size > 0` and `max_objects_per_cell >= 1`.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), GeomError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GeomError::InvalidCellSize(self.cell_size));
        }
        if self.max_objects_per_cell == 0 {
            return Err(GeomError::InvalidCellCapacity);
        }
        Ok(())
    }
}

/// Spans covering more cells than this (or more than the object count,
/// whichever is larger) bypass the buckets.
pub const OVERSIZED_CELL_FLOOR: u128 = 64;

/// Inclusive cell range covered by one rectangle.
#[derive(Debug, Clone, Copy)]
struct CellSpan {
    min: Cell,
    max: Cell,
}

impl CellSpan {
    #[allow(clippy::cast_possible_truncation)]
    fn of(aabb: &Aabb, cell_size: f64) -> Self {
        // `as` saturates on overflow, which keeps absurd coordinates bounded.
        let c = |v: f64| (v / cell_size).floor() as i64;
        Self {
            min: (c(aabb.x()), c(aabb.y())),
            max: (c(aabb.right()), c(aabb.bottom())),
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn cell_count(self) -> u128 {
        let side = |lo: i64, hi: i64| (i128::from(hi) - i128::from(lo) + 1) as u128;
        side(self.min.0, self.max.0).saturating_mul(side(self.min.1, self.max.1))
    }

    fn cells(self) -> impl Iterator<Item = Cell> {
        (self.min.0..=self.max.0).flat_map(move |cx| (self.min.1..=self.max.1).map(move |cy| (cx, cy)))
    }
}

/// Occupancy figures from the most recent rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GridStats {
    /// Cells holding at least one object.
    pub occupied_cells: usize,
    /// Largest bucket length.
    pub max_bucket_len: usize,
    /// Sum of bucket lengths (objects spanning several cells count once per cell).
    pub total_entries: usize,
    /// Objects kept out of the buckets because their span was too large.
    pub oversized: usize,
}

/// Reusable uniform grid mapping cells to the indices of rectangles that
/// touch them.
///
/// Rebuilding reuses bucket allocations from the previous build, which is
/// what the loop driver does every tick.
///
/// A rectangle whose span covers more than
/// `max(object count, OVERSIZED_CELL_FLOOR)` cells is not bucketed. It is
/// tested directly against every other rectangle instead, so per-object
/// work stays bounded by the object count whatever its size relative to
/// `cell_size`.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    config: SpatialHashConfig,
    buckets: FxHashMap<Cell, Vec<usize>>,
    /// `None` marks an oversized rectangle.
    spans: Vec<Option<CellSpan>>,
    oversized: Vec<usize>,
    seen: Vec<usize>,
}

impl SpatialHashGrid {
    /// Creates an empty grid.
    ///
    /// # Errors
    /// Fails if `config` does not validate.
    pub fn new(config: SpatialHashConfig) -> Result<Self, GeomError> {
        config.validate()?;
        Ok(Self {
            config,
            buckets: FxHashMap::default(),
            spans: Vec::new(),
            oversized: Vec::new(),
            seen: Vec::new(),
        })
    }

    /// Configuration the grid was built with.
    pub fn config(&self) -> &SpatialHashConfig {
        &self.config
    }

    /// Replaces the grid contents with `aabbs`.
    ///
    /// Each rectangle is inserted into every cell in
    /// `floor(x/cs)..=floor((x+w)/cs)` by `floor(y/cs)..=floor((y+h)/cs)`,
    /// unless that range is oversized (see the type docs).
    pub fn rebuild(&mut self, aabbs: &[Aabb]) {
        // Drop cells that stayed empty through the last build, empty the rest.
        self.buckets.retain(|_, bucket| {
            let keep = !bucket.is_empty();
            bucket.clear();
            keep
        });
        self.spans.clear();
        self.spans.reserve(aabbs.len());
        self.oversized.clear();

        let limit = (aabbs.len() as u128).max(OVERSIZED_CELL_FLOOR);
        let capacity = self.config.max_objects_per_cell;
        for (index, aabb) in aabbs.iter().enumerate() {
            let span = CellSpan::of(aabb, self.config.cell_size);
            if span.cell_count() > limit {
                self.oversized.push(index);
                self.spans.push(None);
                continue;
            }
            for cell in span.cells() {
                self.buckets
                    .entry(cell)
                    .or_insert_with(|| Vec::with_capacity(capacity))
                    .push(index);
            }
            self.spans.push(Some(span));
        }
        trace!(
            objects = aabbs.len(),
            cells = self.buckets.len(),
            oversized = self.oversized.len(),
            "spatial hash rebuilt"
        );
    }

    /// Runs the exact overlap test on every candidate pair found in the grid.
    ///
    /// `aabbs` must be the slice passed to the last [`rebuild`](Self::rebuild).
    ///
    /// # Errors
    /// Returns [`GeomError::StaleGrid`] when `aabbs.len()` differs from the
    /// length of the last build.
    pub fn query(&mut self, aabbs: &[Aabb]) -> Result<Detection, GeomError> {
        if aabbs.len() != self.spans.len() {
            return Err(GeomError::StaleGrid {
                built: self.spans.len(),
                given: aabbs.len(),
            });
        }
        Ok(self.collect_pairs(aabbs))
    }

    /// Rebuilds from `aabbs` and queries in one step.
    pub fn detect(&mut self, aabbs: &[Aabb]) -> Detection {
        self.rebuild(aabbs);
        self.collect_pairs(aabbs)
    }

    // Candidates for `i` are every bucketed `j > i` sharing a cell, plus every
    // oversized `j > i`; an oversized `i` takes every `j > i`.
    fn collect_pairs(&mut self, aabbs: &[Aabb]) -> Detection {
        let mut out = Detection::default();
        self.seen.clear();
        // seen[j] == i + 1 marks j as already tested against i
        self.seen.resize(aabbs.len(), 0);

        let test = |i: usize, j: usize, out: &mut Detection| {
            out.checks += 1;
            if aabbs[i].overlaps(&aabbs[j]) {
                out.pairs.extend(CollisionPair::new(i, j));
            }
        };

        for (i, span) in self.spans.iter().enumerate() {
            let Some(span) = span else {
                for j in i + 1..aabbs.len() {
                    test(i, j, &mut out);
                }
                continue;
            };
            let marker = i + 1;
            for cell in span.cells() {
                let Some(bucket) = self.buckets.get(&cell) else {
                    continue;
                };
                for &j in bucket {
                    if j <= i || self.seen[j] == marker {
                        continue;
                    }
                    self.seen[j] = marker;
                    test(i, j, &mut out);
                }
            }
            for &j in self.oversized.iter().filter(|&&j| j > i) {
                test(i, j, &mut out);
            }
        }
        out.pairs.sort_unstable();
        out
    }

    /// Occupancy of the current build.
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            oversized: self.oversized.len(),
            ..GridStats::default()
        };
        for bucket in self.buckets.values().filter(|b| !b.is_empty()) {
            stats.occupied_cells += 1;
            stats.max_bucket_len = stats.max_bucket_len.max(bucket.len());
            stats.total_entries += bucket.len();
        }
        stats
    }
}

/// Stateless [`BroadPhase`] wrapper that builds a fresh grid per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialHashDetector {
    config: SpatialHashConfig,
}

impl SpatialHashDetector {
    /// Creates a detector after validating `config`.
    ///
    /// # Errors
    /// Fails if `config` does not validate.
    pub fn new(config: SpatialHashConfig) -> Result<Self, GeomError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl BroadPhase for SpatialHashDetector {
    fn name(&self) -> &'static str {
        "spatial-hash"
    }

    fn detect(&self, aabbs: &[Aabb]) -> Result<Detection, GeomError> {
        detect_spatial_counted(aabbs, &self.config)
    }
}

/// Returns every overlapping pair using a uniform spatial hash.
///
/// Produces the same sorted pair list as
/// [`detect_naive`](crate::detect_naive) for every input.
///
/// # Errors
/// Returns a validation error if `config` is invalid.
pub fn detect_spatial(
    aabbs: &[Aabb],
    config: &SpatialHashConfig,
) -> Result<Vec<CollisionPair>, GeomError> {
    Ok(detect_spatial_counted(aabbs, config)?.pairs)
}

/// Like [`detect_spatial`] but also reports how many exact tests ran.
///
/// # Errors
/// Returns a validation error if `config` is invalid.
pub fn detect_spatial_counted(
    aabbs: &[Aabb],
    config: &SpatialHashConfig,
) -> Result<Detection, GeomError> {
    let mut grid = SpatialHashGrid::new(*config)?;
    Ok(grid.detect(aabbs))
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::Serialize;

/// Two overlapping rectangles, identified by position in the detector input.
///
/// Invariant: `index1 < index2`. Only [`CollisionPair::new`] builds pairs,
/// so reciprocal `(j, i)` duplicates cannot be expressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CollisionPair {
    index1: usize,
    index2: usize,
}

impl CollisionPair {
    /// Builds the canonical pair for two distinct indices in either order.
    ///
    /// Returns `None` when `a == b`; an object never collides with itself.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            core::cmp::Ordering::Less => Some(Self {
                index1: a,
                index2: b,
            }),
            core::cmp::Ordering::Greater => Some(Self {
                index1: b,
                index2: a,
            }),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Lower index.
    pub fn index1(&self) -> usize {
        self.index1
    }

    /// Higher index.
    pub fn index2(&self) -> usize {
        self.index2
    }
}

/// Detector output: the sorted pair list plus the number of exact overlap
/// tests that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    /// Overlapping pairs, sorted ascending by `(index1, index2)`.
    pub pairs: Vec<CollisionPair>,
    /// Exact rectangle tests performed.
    pub checks: u64,
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};

use crate::GeomError;

/// Slack allowed on the far edges by [`Aabb::is_within`].
pub const CONTAINMENT_EPSILON: f64 = 1e-9;

/// Axis-aligned rectangle in arena coordinates.
///
/// Invariants:
/// - `width` and `height` are finite and `>= 0`.
/// - `x` and `y` (the top-left corner) are finite.
///
/// The extent is fixed at construction; only the position moves.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AabbRepr")]
pub struct Aabb {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
struct AabbRepr {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl TryFrom<AabbRepr> for Aabb {
    type Error = GeomError;

    fn try_from(r: AabbRepr) -> Result<Self, Self::Error> {
        Self::new(r.x, r.y, r.width, r.height)
    }
}

impl Aabb {
    /// Constructs a rectangle from its top-left corner and extent.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidExtent`] for negative or non-finite extents
    /// and [`GeomError::InvalidPosition`] for non-finite coordinates.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeomError> {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(GeomError::InvalidExtent { width, height });
        }
        if !(x.is_finite() && y.is_finite()) {
            return Err(GeomError::InvalidPosition { x, y });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Left edge.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Right edge (`x + width`).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Moves the top-left corner, keeping the extent.
    ///
    /// Callers are responsible for passing finite coordinates; the integrator
    /// only ever produces finite positions from finite inputs.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Returns `true` if the two rectangles overlap.
    ///
    /// The test is strict on all four edges: rectangles that merely touch
    /// along an edge (or at a corner) are *not* overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns `true` if the rectangle lies inside `[0, width] x [0, height]`.
    ///
    /// The far edges get [`CONTAINMENT_EPSILON`] of slack: `(w - e) + e` may
    /// round one ulp past `w`.
    #[must_use]
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= width + CONTAINMENT_EPSILON
            && self.bottom() <= height + CONTAINMENT_EPSILON
    }
}

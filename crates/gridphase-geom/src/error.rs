// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Validation errors raised at the geometry API boundary.

use thiserror::Error;

/// Error type for geometry construction and detector configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeomError {
    /// `cell_size` was zero, negative, or not finite.
    #[error("invalid cell size {0}: must be finite and greater than zero")]
    InvalidCellSize(f64),
    /// `max_objects_per_cell` was zero.
    #[error("invalid max objects per cell: must be at least 1")]
    InvalidCellCapacity,
    /// A rectangle had a negative or non-finite extent.
    #[error("invalid extent {width}x{height}: width and height must be finite and >= 0")]
    InvalidExtent {
        /// Offending width.
        width: f64,
        /// Offending height.
        height: f64,
    },
    /// A rectangle position was not finite.
    #[error("invalid position ({x}, {y}): coordinates must be finite")]
    InvalidPosition {
        /// Offending x coordinate.
        x: f64,
        /// Offending y coordinate.
        y: f64,
    },
    /// Mass was zero, negative, or not finite.
    #[error("invalid mass {0}: must be finite and greater than zero")]
    InvalidMass(f64),
    /// Velocity component was not finite.
    #[error("invalid velocity ({vx}, {vy}): components must be finite")]
    InvalidVelocity {
        /// Offending x velocity.
        vx: f64,
        /// Offending y velocity.
        vy: f64,
    },
    /// A grid was queried with a slice other than the one it was built from.
    #[error("stale spatial hash: built from {built} rectangles, queried with {given}")]
    StaleGrid {
        /// Rectangles in the last rebuild.
        built: usize,
        /// Rectangles passed to the query.
        given: usize,
    },
    /// A shape distribution had an empty or inverted range.
    #[error("invalid shape distribution: {0}")]
    InvalidDistribution(String),
}

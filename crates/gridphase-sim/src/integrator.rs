// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Explicit Euler integration with wall containment.
//!
//! Time is measured in *reference frames*: one unit is one frame at 60 Hz
//! (`frame_delta_ms / REFERENCE_FRAME_MS`). Velocities are in arena units per
//! reference frame, so displacement per wall-clock second does not depend on
//! the host frame rate.

use gridphase_geom::PhysicsObject;
use serde::{Deserialize, Serialize};

use crate::SimError;

/// Length of one reference frame in milliseconds (60 Hz).
pub const REFERENCE_FRAME_MS: f64 = 16.67;

/// Converts a wall-clock frame delta to reference-frame units.
pub fn delta_time_units(frame_delta_ms: f64) -> f64 {
    frame_delta_ms / REFERENCE_FRAME_MS
}

/// Arena extent. Objects are contained in `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Arena width.
    pub width: f64,
    /// Arena height.
    pub height: f64,
}

impl Bounds {
    /// Creates validated bounds.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidBounds`] unless both sides are finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, SimError> {
        let b = Self { width, height };
        b.validate()?;
        Ok(b)
    }

    /// Checks that both sides are finite and positive.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidBounds`] otherwise.
    pub fn validate(&self) -> Result<(), SimError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(SimError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Force-like parameters applied before the position update.
///
/// The defaults (`gravity = 0`, `damping = 1`) leave velocities untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorParams {
    /// Downward acceleration in arena units per reference frame squared.
    pub gravity: f64,
    /// Fraction of velocity kept per reference frame, in `(0, 1]`.
    pub damping: f64,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            damping: 1.0,
        }
    }
}

impl IntegratorParams {
    /// Checks `gravity` is finite and `damping` lies in `(0, 1]`.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), SimError> {
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidGravity(self.gravity));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(SimError::InvalidDamping(self.damping));
        }
        Ok(())
    }
}

/// Advances every dynamic object by `dt` reference frames with default params.
///
/// # Errors
/// See [`integrate_with`].
pub fn integrate(objects: &mut [PhysicsObject], dt: f64, bounds: Bounds) -> Result<(), SimError> {
    integrate_with(objects, dt, bounds, &IntegratorParams::default())
}

/// Advances every dynamic object by `dt` reference frames.
///
/// Per object: apply gravity to `vy`, scale velocity by `damping^dt`, move
/// by `v * dt`, then contain each axis independently. A rectangle that
/// crosses `0` or the bound is clamped back inside and the velocity on that
/// axis is turned to point away from the wall, so a corner hit bounces on
/// both axes. Static objects are skipped entirely.
///
/// # Errors
/// Fails fast on a negative or non-finite `dt`, invalid bounds, or invalid
/// params; no object is touched in that case.
pub fn integrate_with(
    objects: &mut [PhysicsObject],
    dt: f64,
    bounds: Bounds,
    params: &IntegratorParams,
) -> Result<(), SimError> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(SimError::InvalidDeltaTime(dt));
    }
    bounds.validate()?;
    params.validate()?;

    let keep = if params.damping < 1.0 {
        params.damping.powf(dt)
    } else {
        1.0
    };

    for obj in objects.iter_mut().filter(|o| !o.is_static()) {
        obj.vy += params.gravity * dt;
        obj.vx *= keep;
        obj.vy *= keep;

        let (w, h) = (obj.aabb().width(), obj.aabb().height());
        let (x, vx) = contain(obj.aabb().x() + obj.vx * dt, obj.vx, w, bounds.width);
        let (y, vy) = contain(obj.aabb().y() + obj.vy * dt, obj.vy, h, bounds.height);
        obj.set_position(x, y);
        obj.vx = vx;
        obj.vy = vy;
    }
    Ok(())
}

/// Clamps one axis into `[0, bound - extent]` and reflects the velocity.
fn contain(pos: f64, vel: f64, extent: f64, bound: f64) -> (f64, f64) {
    let max = (bound - extent).max(0.0);
    if pos < 0.0 {
        (0.0, vel.abs())
    } else if pos > max {
        (max, -vel.abs())
    } else {
        (pos, vel)
    }
}

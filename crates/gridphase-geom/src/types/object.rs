// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::Serialize;

use crate::{Aabb, GeomError};

/// Stable identifier for a physics object.
///
/// Identifiers survive removal of other objects, unlike positional indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId(pub u64);

/// A rectangle with mass and velocity.
///
/// Invariants:
/// - `mass` is finite and `> 0`.
/// - Static objects are never moved by the integrator; their velocity is
///   ignored and stays at whatever it was constructed with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicsObject {
    /// Stable identifier.
    pub id: ObjectId,
    aabb: Aabb,
    /// Horizontal velocity in arena units per reference frame.
    pub vx: f64,
    /// Vertical velocity in arena units per reference frame.
    pub vy: f64,
    mass: f64,
    /// Set by the reconciler when the object took part in a pair this tick.
    pub colliding: bool,
    is_static: bool,
}

impl PhysicsObject {
    /// Creates a dynamic object at rest.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidMass`] if `mass` is not finite and positive.
    pub fn new(id: ObjectId, aabb: Aabb, mass: f64) -> Result<Self, GeomError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(GeomError::InvalidMass(mass));
        }
        Ok(Self {
            id,
            aabb,
            vx: 0.0,
            vy: 0.0,
            mass,
            colliding: false,
            is_static: false,
        })
    }

    /// Sets the initial velocity.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidVelocity`] for non-finite components.
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Result<Self, GeomError> {
        if !(vx.is_finite() && vy.is_finite()) {
            return Err(GeomError::InvalidVelocity { vx, vy });
        }
        self.vx = vx;
        self.vy = vy;
        Ok(self)
    }

    /// Marks the object as static (a wall or anchor).
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Current bounds.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Moves the object, keeping its extent.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.aabb.set_position(x, y);
    }

    /// Mass (always finite and positive).
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Whether the integrator skips this object.
    pub fn is_static(&self) -> bool {
        self.is_static
    }
}

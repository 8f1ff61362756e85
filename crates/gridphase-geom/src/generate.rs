// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded generation of rectangles and physics objects.
//!
//! The shape distribution is fixed per call so that benchmark sizes differ
//! only in object count, never in shape statistics.

use serde::{Deserialize, Serialize};

use crate::{Aabb, GeomError, ObjectId, PhysicsObject, Prng};

/// Parameters of the uniform distributions used to generate test sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeDistribution {
    /// Arena width; generated rectangles lie fully inside it.
    pub arena_width: f64,
    /// Arena height; generated rectangles lie fully inside it.
    pub arena_height: f64,
    /// Smallest side length.
    pub min_size: f64,
    /// Largest side length.
    pub max_size: f64,
    /// Velocity components are drawn from `[-max_speed, max_speed)`.
    pub max_speed: f64,
    /// Lightest mass.
    pub min_mass: f64,
    /// Heaviest mass.
    pub max_mass: f64,
}

impl Default for ShapeDistribution {
    fn default() -> Self {
        Self {
            arena_width: 2000.0,
            arena_height: 2000.0,
            min_size: 4.0,
            max_size: 20.0,
            max_speed: 2.0,
            min_mass: 1.0,
            max_mass: 5.0,
        }
    }
}

impl ShapeDistribution {
    /// Checks that every range is non-empty and the largest shape fits.
    ///
    /// # Errors
    /// Returns [`GeomError::InvalidDistribution`] describing the first problem.
    pub fn validate(&self) -> Result<(), GeomError> {
        let bad = |msg: &str| Err(GeomError::InvalidDistribution(msg.to_owned()));
        let all_finite = [
            self.arena_width,
            self.arena_height,
            self.min_size,
            self.max_size,
            self.max_speed,
            self.min_mass,
            self.max_mass,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return bad("all parameters must be finite");
        }
        if self.min_size < 0.0 || self.max_size < self.min_size {
            return bad("size range must satisfy 0 <= min_size <= max_size");
        }
        if self.max_size > self.arena_width || self.max_size > self.arena_height {
            return bad("max_size must fit inside the arena");
        }
        if self.max_speed < 0.0 {
            return bad("max_speed must be >= 0");
        }
        if self.min_mass <= 0.0 || self.max_mass < self.min_mass {
            return bad("mass range must satisfy 0 < min_mass <= max_mass");
        }
        Ok(())
    }

    fn sample_aabb(&self, prng: &mut Prng) -> Result<Aabb, GeomError> {
        let w = prng.range_f64(self.min_size, self.max_size);
        let h = prng.range_f64(self.min_size, self.max_size);
        let x = prng.range_f64(0.0, self.arena_width - w);
        let y = prng.range_f64(0.0, self.arena_height - h);
        Aabb::new(x, y, w, h)
    }
}

/// Generates `count` rectangles from `seed`.
///
/// # Errors
/// Fails if `dist` does not validate.
pub fn random_aabbs(
    count: usize,
    seed: u64,
    dist: &ShapeDistribution,
) -> Result<Vec<Aabb>, GeomError> {
    dist.validate()?;
    let mut prng = Prng::from_seed_u64(seed);
    (0..count).map(|_| dist.sample_aabb(&mut prng)).collect()
}

/// Generates `count` dynamic objects with ids `first_id..first_id + count`.
///
/// # Errors
/// Fails if `dist` does not validate.
pub fn random_objects(
    count: usize,
    first_id: u64,
    seed: u64,
    dist: &ShapeDistribution,
) -> Result<Vec<PhysicsObject>, GeomError> {
    dist.validate()?;
    let mut prng = Prng::from_seed_u64(seed);
    (first_id..)
        .take(count)
        .map(|id| {
            let aabb = dist.sample_aabb(&mut prng)?;
            let vx = prng.range_f64(-dist.max_speed, dist.max_speed);
            let vy = prng.range_f64(-dist.max_speed, dist.max_speed);
            let mass = prng.range_f64(dist.min_mass, dist.max_mass);
            PhysicsObject::new(ObjectId(id), aabb, mass)?.with_velocity(vx, vy)
        })
        .collect()
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Aggregate kinetic + potential energy, used as a simulation health signal.

use gridphase_geom::PhysicsObject;

/// Sums `0.5*m*|v|^2 + m*g*(reference_height - y)` over dynamic objects.
///
/// `y` grows downward, so potential energy is measured from the top of the
/// object to `reference_height` (usually the arena floor). Static objects
/// contribute nothing. Nothing in the engine enforces conservation; a rising
/// total with `gravity == 0` and no damping points at an integrator bug.
pub fn total_energy(objects: &[PhysicsObject], gravity: f64, reference_height: f64) -> f64 {
    objects
        .iter()
        .filter(|o| !o.is_static())
        .map(|o| {
            let m = o.mass();
            let kinetic = 0.5 * m * (o.vx * o.vx + o.vy * o.vy);
            let potential = m * gravity * (reference_height - o.aabb().y());
            kinetic + potential
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridphase_geom::{Aabb, ObjectId};

    fn obj(y: f64, mass: f64, vx: f64, vy: f64) -> PhysicsObject {
        PhysicsObject::new(ObjectId(0), Aabb::new(0.0, y, 1.0, 1.0).unwrap(), mass)
            .unwrap()
            .with_velocity(vx, vy)
            .unwrap()
    }

    #[test]
    fn kinetic_only_without_gravity() {
        let objs = [obj(10.0, 2.0, 3.0, 4.0)];
        assert_eq!(total_energy(&objs, 0.0, 100.0), 25.0);
    }

    #[test]
    fn potential_measured_from_reference_height() {
        let objs = [obj(40.0, 2.0, 0.0, 0.0)];
        assert_eq!(total_energy(&objs, 0.5, 100.0), 60.0);
    }

    #[test]
    fn statics_contribute_nothing() {
        let objs = [obj(0.0, 10.0, 5.0, 5.0).into_static(), obj(0.0, 1.0, 2.0, 0.0)];
        assert_eq!(total_energy(&objs, 1.0, 0.0), 2.0);
    }

    #[test]
    fn empty_set_has_zero_energy() {
        assert_eq!(total_energy(&[], 9.8, 600.0), 0.0);
    }
}

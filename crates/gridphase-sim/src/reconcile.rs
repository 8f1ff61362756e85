// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Turns a tick's collision pairs into per-object `colliding` flags.
//!
//! Detection runs on the *dynamic view*: the non-static objects in collection
//! order. Static objects never take part in detection, so two walls are
//! never reported as a pair and statics always end a tick with
//! `colliding == false`. Pair indices are therefore positions in the dynamic
//! view, not in the full collection.

use gridphase_geom::{Aabb, CollisionPair, PhysicsObject};
use tracing::debug;

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Objects whose flag ended up `true`.
    pub flagged: usize,
    /// Pairs with an index that did not resolve to a live object.
    pub skipped: usize,
}

/// Positions (in `objects`) of every dynamic object, in collection order.
pub fn dynamic_view(objects: &[PhysicsObject]) -> Vec<usize> {
    objects
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.is_static())
        .map(|(i, _)| i)
        .collect()
}

/// Bounds of every dynamic object, in dynamic-view order.
pub fn dynamic_aabbs(objects: &[PhysicsObject], out: &mut Vec<Aabb>) {
    out.clear();
    out.extend(objects.iter().filter(|o| !o.is_static()).map(|o| *o.aabb()));
}

/// Clears every `colliding` flag, then sets it on both members of each pair.
///
/// Pair indices are resolved through [`dynamic_view`]. An index past the end
/// of the view (the collection shrank after detection) is skipped and
/// counted, never treated as an error.
pub fn reconcile(objects: &mut [PhysicsObject], pairs: &[CollisionPair]) -> ReconcileOutcome {
    let view = dynamic_view(objects);
    for obj in objects.iter_mut() {
        obj.colliding = false;
    }

    let mut outcome = ReconcileOutcome::default();
    for pair in pairs {
        match (view.get(pair.index1()), view.get(pair.index2())) {
            (Some(&a), Some(&b)) => {
                objects[a].colliding = true;
                objects[b].colliding = true;
            }
            _ => outcome.skipped += 1,
        }
    }
    outcome.flagged = objects.iter().filter(|o| o.colliding).count();
    if outcome.skipped > 0 {
        debug!(skipped = outcome.skipped, "reconcile skipped unresolved pairs");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridphase_geom::{detect_naive, ObjectId};

    fn obj(id: u64, x: f64) -> PhysicsObject {
        PhysicsObject::new(ObjectId(id), Aabb::new(x, 0.0, 10.0, 10.0).unwrap(), 1.0).unwrap()
    }

    fn pair(a: usize, b: usize) -> CollisionPair {
        CollisionPair::new(a, b).unwrap()
    }

    #[test]
    fn resets_stale_flags_and_sets_new_ones() {
        let mut objs = vec![obj(0, 0.0), obj(1, 5.0), obj(2, 100.0)];
        objs[2].colliding = true;
        let out = reconcile(&mut objs, &[pair(0, 1)]);
        let flags: Vec<bool> = objs.iter().map(|o| o.colliding).collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(out, ReconcileOutcome { flagged: 2, skipped: 0 });
    }

    #[test]
    fn unresolved_indices_are_skipped() {
        let mut objs = vec![obj(0, 0.0), obj(1, 5.0)];
        let out = reconcile(&mut objs, &[pair(0, 1), pair(1, 7), pair(5, 9)]);
        assert_eq!(out.skipped, 2);
        assert!(objs.iter().all(|o| o.colliding));
    }

    #[test]
    fn pair_indices_resolve_through_dynamic_view() {
        // wall at position 1 shifts the dynamic view: [0, 2, 3]
        let mut objs = vec![obj(0, 0.0), obj(9, 2.0).into_static(), obj(1, 5.0), obj(2, 300.0)];
        assert_eq!(dynamic_view(&objs), vec![0, 2, 3]);
        reconcile(&mut objs, &[pair(0, 1)]);
        let flags: Vec<bool> = objs.iter().map(|o| o.colliding).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn static_pairs_are_never_detected() {
        // Two overlapping walls and one dynamic box resting on them.
        let objs = vec![
            obj(0, 0.0).into_static(),
            obj(1, 3.0).into_static(),
            obj(2, 6.0),
        ];
        let mut boxes = Vec::new();
        dynamic_aabbs(&objs, &mut boxes);
        assert_eq!(boxes.len(), 1);
        assert!(detect_naive(&boxes).is_empty());
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
//! Cross-validation of the spatial hash against the naive oracle.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use gridphase_geom::generate::{random_aabbs, ShapeDistribution};
use gridphase_geom::{
    detect_naive, detect_spatial, Aabb, BroadPhase, CollisionPair, NaiveDetector,
    SpatialHashConfig, SpatialHashDetector,
};

fn aabb_strategy() -> impl Strategy<Value = Aabb> {
    (-200.0f64..200.0, -200.0f64..200.0, 0.0f64..60.0, 0.0f64..60.0)
        .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h).unwrap())
}

// mostly small boxes with the occasional arena-sized one
fn mixed_size_strategy() -> impl Strategy<Value = Aabb> {
    prop_oneof![
        4 => aabb_strategy(),
        1 => (-200.0f64..200.0, -200.0f64..200.0, 200.0f64..3_000.0, 200.0f64..3_000.0)
            .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h).unwrap()),
    ]
}

fn as_set(pairs: &[CollisionPair]) -> HashSet<(usize, usize)> {
    pairs.iter().map(|p| (p.index1(), p.index2())).collect()
}

#[test]
fn scenario_a_two_overlapping_one_far() {
    let boxes = [
        Aabb::new(0.0, 0.0, 10.0, 10.0).unwrap(),
        Aabb::new(5.0, 5.0, 10.0, 10.0).unwrap(),
        Aabb::new(100.0, 100.0, 10.0, 10.0).unwrap(),
    ];
    let expected = vec![CollisionPair::new(0, 1).unwrap()];
    assert_eq!(detect_naive(&boxes), expected);
    for cs in [1.0, 7.5, 10.0, 50.0, 1_000.0] {
        let cfg = SpatialHashConfig::with_cell_size(cs).unwrap();
        let pairs = detect_spatial(&boxes, &cfg).unwrap();
        assert_eq!(pairs, expected, "cell size {cs}");
        assert!(pairs.iter().all(|p| p.index2() != 2));
    }
}

#[test]
fn trait_objects_agree_on_generated_sets() {
    let dist = ShapeDistribution {
        arena_width: 400.0,
        arena_height: 400.0,
        ..Default::default()
    };
    let detectors: Vec<Box<dyn BroadPhase>> = vec![
        Box::new(NaiveDetector),
        Box::new(SpatialHashDetector::new(SpatialHashConfig::with_cell_size(16.0).unwrap()).unwrap()),
    ];
    for n in [0usize, 1, 2, 10, 100, 400] {
        let boxes = random_aabbs(n, n as u64, &dist).unwrap();
        let results: Vec<_> = detectors
            .iter()
            .map(|d| d.detect(&boxes).unwrap().pairs)
            .collect();
        assert_eq!(results[0], results[1], "n = {n}");
    }
}

#[test]
fn spatial_matches_naive_with_pinned_seed() {
    const SEED_BYTES: [u8; 32] = [
        0x42, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);

    let input = (prop::collection::vec(aabb_strategy(), 0..80), 0.5f64..120.0);
    runner
        .run(&input, |(boxes, cell_size)| {
            let cfg = SpatialHashConfig::with_cell_size(cell_size).unwrap();
            let naive = detect_naive(&boxes);
            let spatial = detect_spatial(&boxes, &cfg).unwrap();
            prop_assert_eq!(as_set(&naive), as_set(&spatial));
            prop_assert_eq!(naive, spatial);
            Ok(())
        })
        .unwrap();
}

proptest! {
    #[test]
    fn no_duplicates_or_reciprocals(
        boxes in prop::collection::vec(aabb_strategy(), 0..60),
        cell_size in 1.0f64..80.0,
    ) {
        let cfg = SpatialHashConfig::with_cell_size(cell_size).unwrap();
        let pairs = detect_spatial(&boxes, &cfg).unwrap();
        let mut seen = HashSet::new();
        for p in &pairs {
            prop_assert!(p.index1() < p.index2());
            prop_assert!(p.index2() < boxes.len());
            prop_assert!(seen.insert((p.index1(), p.index2())));
        }
    }

    #[test]
    fn detection_is_deterministic(
        boxes in prop::collection::vec(aabb_strategy(), 0..60),
        cell_size in 1.0f64..80.0,
    ) {
        let cfg = SpatialHashConfig::with_cell_size(cell_size).unwrap();
        let first = detect_spatial(&boxes, &cfg).unwrap();
        let second = detect_spatial(&boxes, &cfg).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn oversized_boxes_match_naive(
        boxes in prop::collection::vec(mixed_size_strategy(), 0..40),
        cell_size in 1.0f64..8.0,
    ) {
        let cfg = SpatialHashConfig::with_cell_size(cell_size).unwrap();
        prop_assert_eq!(detect_spatial(&boxes, &cfg).unwrap(), detect_naive(&boxes));
    }
}

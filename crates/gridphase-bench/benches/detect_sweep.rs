// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridphase_geom::generate::{random_aabbs, ShapeDistribution};
use gridphase_geom::{BroadPhase, NaiveDetector, SpatialHashConfig, SpatialHashDetector, SpatialHashGrid};
use std::hint::black_box;

const SIZES: &[usize] = &[10, 100, 500, 1_000, 2_000];

fn bench_detectors(c: &mut Criterion) {
    let shape = ShapeDistribution::default();
    let config = SpatialHashConfig::with_cell_size(32.0).expect("cell size");
    let spatial = SpatialHashDetector::new(config).expect("detector");

    let mut group = c.benchmark_group("broad_phase");
    for &n in SIZES {
        let aabbs = random_aabbs(n, 0xbe4c_0001 ^ n as u64, &shape).expect("test set");
        group.throughput(Throughput::Elements(n as u64));
        // the O(n^2) arm gets slow fast; keep its sample count modest
        if n <= 1_000 {
            group.bench_with_input(BenchmarkId::new("naive", n), &aabbs, |b, aabbs| {
                b.iter(|| black_box(NaiveDetector.detect(black_box(aabbs)).expect("naive")));
            });
        }
        group.bench_with_input(BenchmarkId::new("spatial_hash", n), &aabbs, |b, aabbs| {
            b.iter(|| black_box(spatial.detect(black_box(aabbs)).expect("spatial")));
        });
    }
    group.finish();
}

// Reusing one grid across frames is the driver's steady state.
fn bench_grid_reuse(c: &mut Criterion) {
    let shape = ShapeDistribution::default();
    let mut group = c.benchmark_group("grid_reuse");
    for &cell in &[16.0_f64, 32.0, 64.0, 128.0] {
        let aabbs = random_aabbs(2_000, 7, &shape).expect("test set");
        let config = SpatialHashConfig::with_cell_size(cell).expect("cell size");
        let mut grid = SpatialHashGrid::new(config).expect("grid");
        group.bench_with_input(BenchmarkId::from_parameter(cell), &aabbs, |b, aabbs| {
            b.iter(|| black_box(grid.detect(black_box(aabbs))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detectors, bench_grid_reuse);
criterion_main!(benches);

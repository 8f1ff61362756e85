// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Speedup measurement for the spatial hash against the naive baseline.
//!
//! Protocol per object count:
//! 1. Generate a fresh test set with a fixed shape distribution.
//! 2. Run both detectors once, unmeasured (warm-up).
//! 3. Time `iterations` runs of each detector on the same input.
//! 4. Check both report the same collision count.
//! 5. `speedup = naive_time_ms / spatial_time_ms`.
//! 6. Hand the entry to the progress callback and yield to the runtime
//!    before the next size.
//!
//! A failing size becomes [`SweepEntry::Failed`]; the sweep carries on.

mod harness;

pub use harness::{
    run_benchmark, run_sweep, BenchError, BenchmarkResult, Harness, HarnessConfig, SweepEntry,
};

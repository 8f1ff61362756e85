// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use std::hint::black_box;
use std::time::Instant;

use gridphase_geom::generate::{random_aabbs, ShapeDistribution};
use gridphase_geom::{
    Aabb, BroadPhase, GeomError, NaiveDetector, SpatialHashConfig, SpatialHashDetector,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Shortest duration a measurement may report, in milliseconds (1 ns).
///
/// Keeps `speedup` finite and positive when a tiny input finishes below the
/// clock resolution.
const MIN_MEASURED_MS: f64 = 1e-6;

/// Errors that fail a single benchmark entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchError {
    /// Test-set generation or detector configuration failed.
    #[error(transparent)]
    Geom(#[from] GeomError),
    /// `iterations` was zero.
    #[error("iterations must be at least 1")]
    NoIterations,
    /// The two detectors disagreed on the same input.
    #[error("collision count mismatch for {object_count} objects: {baseline} (baseline) vs {accelerated} (accelerated)")]
    CountMismatch {
        /// Size of the test set.
        object_count: usize,
        /// Pairs reported by the baseline detector.
        baseline: usize,
        /// Pairs reported by the accelerated detector.
        accelerated: usize,
    },
}

/// Timing for one object count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Size of the test set.
    pub object_count: usize,
    /// Mean wall-clock time of one baseline run.
    pub naive_time_ms: f64,
    /// Mean wall-clock time of one accelerated run.
    pub spatial_time_ms: f64,
    /// `naive_time_ms / spatial_time_ms`.
    pub speedup: f64,
    /// Pairs found (identical for both detectors).
    pub collision_count: usize,
}

/// One sweep slot: a measurement or the reason it could not be taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepEntry {
    /// Both detectors ran and agreed.
    Measured(BenchmarkResult),
    /// The entry failed; the sweep continued past it.
    Failed {
        /// Size that failed.
        object_count: usize,
        /// Human-readable cause.
        reason: String,
    },
}

impl SweepEntry {
    /// Object count of this slot.
    pub fn object_count(&self) -> usize {
        match self {
            Self::Measured(r) => r.object_count,
            Self::Failed { object_count, .. } => *object_count,
        }
    }

    /// The measurement, if the entry succeeded.
    pub fn result(&self) -> Option<&BenchmarkResult> {
        match self {
            Self::Measured(r) => Some(r),
            Self::Failed { .. } => None,
        }
    }
}

/// Knobs shared by every entry of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Measured runs per detector (after one warm-up run).
    pub iterations: u32,
    /// Base seed; each size uses `seed ^ object_count`.
    pub seed: u64,
    /// Shape statistics of generated test sets.
    pub shape: ShapeDistribution,
    /// Configuration of the accelerated detector.
    pub spatial_hash: SpatialHashConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            seed: 0xbe4c_0001,
            shape: ShapeDistribution::default(),
            spatial_hash: SpatialHashConfig {
                cell_size: 32.0,
                ..SpatialHashConfig::default()
            },
        }
    }
}

/// Measures a baseline detector against an accelerated one.
#[derive(Debug, Clone)]
pub struct Harness<B, A> {
    config: HarnessConfig,
    baseline: B,
    accelerated: A,
}

impl Harness<NaiveDetector, SpatialHashDetector> {
    /// Naive baseline against the spatial hash from `config`.
    ///
    /// # Errors
    /// Fails fast on an invalid spatial-hash or shape configuration.
    pub fn new(config: HarnessConfig) -> Result<Self, BenchError> {
        let accelerated = SpatialHashDetector::new(config.spatial_hash)?;
        Self::with_detectors(config, NaiveDetector, accelerated)
    }
}

impl<B, A> Harness<B, A>
where
    B: BroadPhase,
    A: BroadPhase,
{
    /// Harness over arbitrary detectors.
    ///
    /// # Errors
    /// Fails fast on zero iterations or an invalid shape distribution.
    pub fn with_detectors(config: HarnessConfig, baseline: B, accelerated: A) -> Result<Self, BenchError> {
        if config.iterations == 0 {
            return Err(BenchError::NoIterations);
        }
        config.shape.validate()?;
        Ok(Self {
            config,
            baseline,
            accelerated,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Measures one object count.
    ///
    /// # Errors
    /// Returns the first failure from generation, either detector, or the
    /// count consistency check.
    #[instrument(skip(self), fields(baseline = self.baseline.name(), accelerated = self.accelerated.name()))]
    pub fn run_benchmark(&self, object_count: usize) -> Result<BenchmarkResult, BenchError> {
        let seed = self.config.seed ^ object_count as u64;
        let aabbs = random_aabbs(object_count, seed, &self.config.shape)?;

        // warm-up, unmeasured
        black_box(self.baseline.detect(&aabbs)?);
        black_box(self.accelerated.detect(&aabbs)?);

        let (naive_time_ms, baseline) = self.measure(&self.baseline, &aabbs)?;
        let (spatial_time_ms, accelerated) = self.measure(&self.accelerated, &aabbs)?;
        if baseline != accelerated {
            return Err(BenchError::CountMismatch {
                object_count,
                baseline,
                accelerated,
            });
        }

        let result = BenchmarkResult {
            object_count,
            naive_time_ms,
            spatial_time_ms,
            speedup: naive_time_ms / spatial_time_ms,
            collision_count: baseline,
        };
        debug!(?result, "benchmark entry measured");
        Ok(result)
    }

    /// Mean milliseconds per run and the pair count of the last run.
    fn measure<D: BroadPhase>(&self, detector: &D, aabbs: &[Aabb]) -> Result<(f64, usize), BenchError> {
        let mut count = 0;
        let started = Instant::now();
        for _ in 0..self.config.iterations {
            count = black_box(detector.detect(black_box(aabbs))?).pairs.len();
        }
        let total_ms = started.elapsed().as_secs_f64() * 1_000.0;
        let mean = total_ms / f64::from(self.config.iterations);
        Ok((mean.max(MIN_MEASURED_MS), count))
    }

    /// Measures every size in order, streaming entries to `on_progress`.
    ///
    /// Control returns to the async runtime between sizes so a long sweep
    /// does not starve other tasks. A size that fails is recorded as
    /// [`SweepEntry::Failed`] and the sweep moves on.
    #[instrument(skip(self, sizes, on_progress), fields(sizes = sizes.len()))]
    pub async fn run_sweep<F>(&self, sizes: &[usize], mut on_progress: F) -> Vec<SweepEntry>
    where
        F: FnMut(&SweepEntry),
    {
        info!("benchmark sweep started");
        let mut entries = Vec::with_capacity(sizes.len());
        for &object_count in sizes {
            let entry = match self.run_benchmark(object_count) {
                Ok(result) => {
                    info!(
                        object_count,
                        speedup = result.speedup,
                        collisions = result.collision_count,
                        "sweep entry measured"
                    );
                    SweepEntry::Measured(result)
                }
                Err(err) => {
                    warn!(object_count, %err, "sweep entry failed; continuing");
                    SweepEntry::Failed {
                        object_count,
                        reason: err.to_string(),
                    }
                }
            };
            on_progress(&entry);
            entries.push(entry);
            tokio::task::yield_now().await;
        }
        info!(entries = entries.len(), "benchmark sweep finished");
        entries
    }
}

/// Measures one object count with the default harness.
///
/// # Errors
/// See [`Harness::run_benchmark`].
pub fn run_benchmark(object_count: usize) -> Result<BenchmarkResult, BenchError> {
    Harness::new(HarnessConfig::default())?.run_benchmark(object_count)
}

/// Runs a sweep with the default harness.
///
/// If the default harness itself cannot be built, every size is reported as
/// failed with that reason.
pub async fn run_sweep<F>(sizes: &[usize], mut on_progress: F) -> Vec<SweepEntry>
where
    F: FnMut(&SweepEntry),
{
    match Harness::new(HarnessConfig::default()) {
        Ok(harness) => harness.run_sweep(sizes, on_progress).await,
        Err(err) => sizes
            .iter()
            .map(|&object_count| {
                let entry = SweepEntry::Failed {
                    object_count,
                    reason: err.to_string(),
                };
                on_progress(&entry);
                entry
            })
            .collect(),
    }
}

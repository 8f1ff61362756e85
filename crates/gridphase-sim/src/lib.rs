// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! gridphase-sim: discrete-time simulation on top of the broad-phase.
//!
//! One tick runs strictly in order: apply buffered commands, integrate,
//! detect, reconcile `colliding` flags, compute energy, notify the observer,
//! update FPS accounting. Everything here is single-threaded and
//! run-to-completion; the host decides when frames fire.

pub mod command;
pub mod config;
pub mod driver;
pub mod energy;
mod error;
pub mod host;
pub mod integrator;
pub mod perf;
pub mod reconcile;
pub mod schedule;

pub use command::{Command, CommandBuffer};
pub use config::{
    ConfigError, ConfigService, ConfigStore, FsConfigStore, InMemoryConfigStore, SimConfig,
    SIM_CONFIG_KEY,
};
pub use driver::{DriverState, FrameObserver, LoopDriver, TickReport};
pub use energy::total_energy;
pub use error::SimError;
pub use host::TokioFrameHost;
pub use integrator::{
    delta_time_units, integrate, integrate_with, Bounds, IntegratorParams, REFERENCE_FRAME_MS,
};
pub use perf::{FpsCounter, PerformanceStats};
pub use reconcile::{dynamic_aabbs, dynamic_view, reconcile, ReconcileOutcome};
pub use schedule::{FrameHandle, FrameQueue, FrameScheduler};

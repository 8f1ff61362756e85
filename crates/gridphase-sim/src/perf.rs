// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-tick counters and frame-rate accounting for a HUD.

use serde::Serialize;

/// Reference frames that make up one FPS reporting window (one second at 60 Hz).
pub const FPS_WINDOW_UNITS: f64 = 60.0;

/// Snapshot of the most recent tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    /// Exact rectangle tests performed by the detector.
    pub collision_checks_attempted: u64,
    /// Pairs that actually overlapped.
    pub actual_collisions: usize,
    /// Frames per second from the last completed reporting window.
    pub fps: f64,
    /// Wall-clock time spent executing the tick, in milliseconds.
    pub last_frame_time_ms: f64,
    /// Output of the energy accountant for this tick.
    pub total_energy: f64,
}

/// Accumulates tick lengths and emits an FPS figure once per window.
///
/// Ticks are counted against elapsed reference frames, so a host running at
/// 30 Hz reports 30 after 30 ticks of 2 units each.
#[derive(Debug, Clone, Copy, Default)]
pub struct FpsCounter {
    ticks: u32,
    accumulated: f64,
}

impl FpsCounter {
    /// Records one tick of `dt` reference frames.
    ///
    /// Returns `Some(fps)` when the accumulator reaches the window length,
    /// resetting both counters.
    pub fn record(&mut self, dt: f64) -> Option<f64> {
        self.ticks += 1;
        self.accumulated += dt;
        if self.accumulated < FPS_WINDOW_UNITS {
            return None;
        }
        let fps = f64::from(self.ticks) * FPS_WINDOW_UNITS / self.accumulated;
        self.reset();
        Some(fps)
    }

    /// Clears the window (used when the loop restarts).
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.accumulated = 0.0;
    }
}

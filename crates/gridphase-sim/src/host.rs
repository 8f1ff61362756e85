// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless frame host backed by a Tokio interval.

use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tracing::{info, instrument};

use crate::{DriverState, FrameQueue, LoopDriver, PerformanceStats, SimError};

/// Fires the driver's frame handles on a fixed wall-clock cadence.
///
/// A late timer tick is skipped rather than bursted; the driver measures the
/// real elapsed time, so a missed frame shows up as a longer `dt`.
#[derive(Debug)]
pub struct TokioFrameHost {
    interval: Duration,
    queue: FrameQueue,
}

impl TokioFrameHost {
    /// Creates a host firing every `interval` (at least 1 ms).
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            queue: FrameQueue::default(),
        }
    }

    /// Creates a host targeting `fps` frames per second.
    pub fn with_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    /// Starts `driver`, runs `max_ticks` ticks, then stops it.
    ///
    /// # Errors
    /// Propagates the first failed tick; the driver is already stopped then.
    #[instrument(skip(self, driver))]
    pub async fn run(
        &mut self,
        driver: &mut LoopDriver,
        max_ticks: u64,
    ) -> Result<PerformanceStats, SimError> {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let target = driver.ticks().saturating_add(max_ticks);
        driver.start(Instant::now(), &mut self.queue);
        info!("frame host running. Interval: {:?}", self.interval);

        while driver.ticks() < target && driver.state() == DriverState::Running {
            interval.tick().await;
            let now = Instant::now();
            for handle in self.queue.take_due() {
                driver.on_frame(handle, now, &mut self.queue)?;
            }
        }

        driver.stop(&mut self.queue);
        Ok(*driver.stats())
    }
}

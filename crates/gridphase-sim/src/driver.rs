// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The simulation loop driver.
//!
//! State machine: `Stopped` ⇄ `Running`. While running, exactly one frame
//! handle is outstanding with the host scheduler. Firing it runs one tick and
//! requests the next handle only after the tick finishes. `stop()` cancels
//! the outstanding handle and the driver ignores any handle that is not the
//! one it is waiting for, so no tick can run after `stop()` returns.

use std::time::Instant;

use gridphase_geom::{detect_naive_counted, Aabb, CollisionPair, PhysicsObject, SpatialHashGrid};
use tracing::{debug, info, instrument, warn};

use crate::integrator::delta_time_units;
use crate::reconcile::dynamic_aabbs;
use crate::{
    integrate_with, reconcile, total_energy, Command, CommandBuffer, FpsCounter, FrameHandle,
    FrameScheduler, PerformanceStats, SimConfig, SimError,
};

/// Lifecycle of the loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DriverState {
    /// No frame outstanding; ticks only run through [`LoopDriver::step`].
    Stopped,
    /// One frame handle outstanding with the host.
    Running,
}

/// Read-only view handed to the observer after each completed tick.
#[derive(Debug, Clone, Copy)]
pub struct TickReport<'a> {
    /// Ticks completed since the driver was created, including this one.
    pub tick: u64,
    /// The full collection with fresh `colliding` flags.
    pub objects: &'a [PhysicsObject],
    /// Pairs detected this tick, indexed into the dynamic view.
    pub pairs: &'a [CollisionPair],
    /// Counters for this tick.
    pub stats: &'a PerformanceStats,
}

/// Receives exactly one report per completed tick (a renderer, a HUD).
pub trait FrameObserver {
    /// Called after reconciliation and energy accounting, before FPS update.
    fn on_tick(&mut self, report: &TickReport<'_>);
}

impl<F> FrameObserver for F
where
    F: FnMut(&TickReport<'_>),
{
    fn on_tick(&mut self, report: &TickReport<'_>) {
        self(report);
    }
}

/// Owns the object collection and runs ticks.
pub struct LoopDriver {
    config: SimConfig,
    state: DriverState,
    objects: Vec<PhysicsObject>,
    pairs: Vec<CollisionPair>,
    commands: CommandBuffer,
    grid: SpatialHashGrid,
    scratch: Vec<Aabb>,
    pending: Option<FrameHandle>,
    last_frame: Option<Instant>,
    fps: FpsCounter,
    stats: PerformanceStats,
    ticks: u64,
    observer: Option<Box<dyn FrameObserver>>,
}

impl core::fmt::Debug for LoopDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoopDriver")
            .field("state", &self.state)
            .field("objects", &self.objects.len())
            .field("ticks", &self.ticks)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl LoopDriver {
    /// Creates a stopped driver over an existing collection.
    ///
    /// # Errors
    /// Fails fast if `config` does not validate.
    pub fn new(config: SimConfig, objects: Vec<PhysicsObject>) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            grid: SpatialHashGrid::new(config.spatial_hash)?,
            config,
            state: DriverState::Stopped,
            objects,
            pairs: Vec::new(),
            commands: CommandBuffer::default(),
            scratch: Vec::new(),
            pending: None,
            last_frame: None,
            fps: FpsCounter::default(),
            stats: PerformanceStats::default(),
            ticks: 0,
            observer: None,
        })
    }

    /// Creates a stopped driver populated by [`SimConfig::spawn_objects`].
    ///
    /// # Errors
    /// Fails fast if `config` does not validate.
    pub fn from_config(config: SimConfig) -> Result<Self, SimError> {
        let objects = config.spawn_objects()?;
        Self::new(config, objects)
    }

    /// Registers the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl FrameObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Object collection as of the last completed tick.
    pub fn objects(&self) -> &[PhysicsObject] {
        &self.objects
    }

    /// Pairs from the last completed tick (dynamic-view indices).
    pub fn pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }

    /// Counters from the last completed tick.
    pub fn stats(&self) -> &PerformanceStats {
        &self.stats
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Active configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Buffers an external mutation; it is applied at the next tick boundary.
    pub fn enqueue(&mut self, cmd: Command) {
        self.commands.push(cmd);
    }

    /// Transitions to `Running`: captures `now` as the time baseline and
    /// requests the first frame. Calling `start` while running is a no-op.
    #[instrument(skip(self, scheduler))]
    pub fn start(&mut self, now: Instant, scheduler: &mut dyn FrameScheduler) {
        if self.state == DriverState::Running {
            debug!("start ignored: already running");
            return;
        }
        self.last_frame = Some(now);
        self.fps.reset();
        self.pending = Some(scheduler.request_frame());
        self.state = DriverState::Running;
        info!(objects = self.objects.len(), "simulation started");
    }

    /// Transitions to `Stopped`, cancelling the outstanding frame.
    ///
    /// After this returns no tick runs until the next [`start`](Self::start),
    /// which resets the time baseline instead of resuming mid-phase.
    #[instrument(skip(self, scheduler))]
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        if self.state == DriverState::Running {
            info!(ticks = self.ticks, "simulation stopped");
        }
        self.state = DriverState::Stopped;
        self.last_frame = None;
    }

    /// Host callback for a fired frame handle.
    ///
    /// Runs one tick with `dt` derived from the wall-clock time since the
    /// previous frame, then requests the next frame. Returns `Ok(None)`
    /// without ticking when stopped or when `handle` is not the outstanding
    /// one.
    ///
    /// # Errors
    /// A failed tick stops the loop and returns the error.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<Option<PerformanceStats>, SimError> {
        if self.state != DriverState::Running || self.pending != Some(handle) {
            debug!(handle = handle.value(), "ignoring stale frame");
            return Ok(None);
        }
        self.pending = None;

        let elapsed_ms = self
            .last_frame
            .map_or(0.0, |prev| now.saturating_duration_since(prev).as_secs_f64() * 1_000.0);
        self.last_frame = Some(now);

        match self.step(delta_time_units(elapsed_ms)) {
            Ok(stats) => {
                self.pending = Some(scheduler.request_frame());
                Ok(Some(stats))
            }
            Err(err) => {
                warn!(%err, "tick failed; stopping");
                self.stop(scheduler);
                Err(err)
            }
        }
    }

    /// Runs one tick of `dt` reference frames regardless of state.
    ///
    /// Order: apply buffered commands, integrate, detect, reconcile, energy,
    /// notify observer, FPS accounting.
    ///
    /// # Errors
    /// Fails on a negative or non-finite `dt`; the collection is untouched
    /// apart from buffered commands already applied.
    pub fn step(&mut self, dt: f64) -> Result<PerformanceStats, SimError> {
        let started = Instant::now();

        let applied = self.commands.apply(&mut self.objects, self.config.bounds);
        if applied > 0 {
            debug!(applied, "applied buffered commands");
        }

        integrate_with(&mut self.objects, dt, self.config.bounds, &self.config.integrator)?;

        dynamic_aabbs(&self.objects, &mut self.scratch);
        let detection = if self.config.spatial_hash.enabled {
            self.grid.detect(&self.scratch)
        } else {
            detect_naive_counted(&self.scratch)
        };
        self.pairs = detection.pairs;

        reconcile(&mut self.objects, &self.pairs);

        let energy = total_energy(
            &self.objects,
            self.config.integrator.gravity,
            self.config.reference_height(),
        );

        self.ticks += 1;
        self.stats.collision_checks_attempted = detection.checks;
        self.stats.actual_collisions = self.pairs.len();
        self.stats.total_energy = energy;
        self.stats.last_frame_time_ms = started.elapsed().as_secs_f64() * 1_000.0;

        if let Some(observer) = self.observer.as_mut() {
            observer.on_tick(&TickReport {
                tick: self.ticks,
                objects: &self.objects,
                pairs: &self.pairs,
                stats: &self.stats,
            });
        }

        if let Some(fps) = self.fps.record(dt) {
            self.stats.fps = fps;
            debug!(fps, "fps window closed");
        }
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bounds, FrameQueue};
    use gridphase_geom::{ObjectId, SpatialHashConfig};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn obj(id: u64, x: f64, y: f64, vx: f64) -> PhysicsObject {
        PhysicsObject::new(ObjectId(id), Aabb::new(x, y, 10.0, 10.0).unwrap(), 1.0)
            .unwrap()
            .with_velocity(vx, 0.0)
            .unwrap()
    }

    fn config() -> SimConfig {
        SimConfig {
            object_count: 0,
            bounds: Bounds::new(200.0, 200.0).unwrap(),
            ..SimConfig::default()
        }
    }

    fn frame_ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = config();
        cfg.spatial_hash.cell_size = -1.0;
        assert!(matches!(LoopDriver::new(cfg, vec![]), Err(SimError::Geom(_))));
    }

    #[test]
    fn step_flags_colliding_objects() {
        let objs = vec![
            obj(0, 0.0, 0.0, 0.0),
            obj(1, 5.0, 5.0, 0.0),
            obj(2, 100.0, 100.0, 0.0),
        ];
        let mut driver = LoopDriver::new(config(), objs).unwrap();
        let stats = driver.step(1.0).unwrap();
        assert_eq!(stats.actual_collisions, 1);
        let flags: Vec<bool> = driver.objects().iter().map(|o| o.colliding).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn disabled_hash_falls_back_to_naive() {
        let mut cfg = config();
        cfg.spatial_hash = SpatialHashConfig {
            enabled: false,
            ..SpatialHashConfig::default()
        };
        let objs: Vec<_> = (0..5u32)
            .map(|i| obj(u64::from(i), f64::from(i) * 40.0, 0.0, 0.0))
            .collect();
        let mut driver = LoopDriver::new(cfg, objs).unwrap();
        let stats = driver.step(1.0).unwrap();
        assert_eq!(stats.collision_checks_attempted, 10);
    }

    #[test]
    fn observer_sees_each_tick_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut driver = LoopDriver::new(config(), vec![obj(0, 0.0, 0.0, 1.0)]).unwrap();
        driver.set_observer(move |r: &TickReport<'_>| sink.borrow_mut().push(r.tick));
        for _ in 0..3 {
            driver.step(1.0).unwrap();
        }
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn frames_drive_ticks_until_stopped() {
        let mut queue = FrameQueue::default();
        let mut driver = LoopDriver::new(config(), vec![obj(0, 10.0, 10.0, 1.0)]).unwrap();
        let t0 = Instant::now();
        driver.start(t0, &mut queue);
        assert_eq!(driver.state(), DriverState::Running);

        for i in 1..=3u32 {
            let due = queue.take_due();
            assert_eq!(due.len(), 1);
            let now = t0 + frame_ms(17) * i;
            assert!(driver.on_frame(due[0], now, &mut queue).unwrap().is_some());
        }
        assert_eq!(driver.ticks(), 3);

        driver.stop(&mut queue);
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn stale_handles_never_tick() {
        let mut queue = FrameQueue::default();
        let mut driver = LoopDriver::new(config(), vec![obj(0, 10.0, 10.0, 1.0)]).unwrap();
        let t0 = Instant::now();
        driver.start(t0, &mut queue);
        let first = queue.take_due()[0];
        driver.stop(&mut queue);

        // host fires the handle it captured before stop
        assert_eq!(driver.on_frame(first, t0 + frame_ms(16), &mut queue).unwrap(), None);
        assert_eq!(driver.ticks(), 0);

        driver.start(t0 + frame_ms(100), &mut queue);
        assert_eq!(driver.on_frame(first, t0 + frame_ms(116), &mut queue).unwrap(), None);
        let current = queue.take_due()[0];
        assert!(driver
            .on_frame(current, t0 + frame_ms(117), &mut queue)
            .unwrap()
            .is_some());
        assert_eq!(driver.ticks(), 1);
    }

    #[test]
    fn restart_resets_time_baseline() {
        let mut queue = FrameQueue::default();
        let mut driver = LoopDriver::new(config(), vec![obj(0, 10.0, 10.0, 1.0)]).unwrap();
        let t0 = Instant::now();
        driver.start(t0, &mut queue);
        driver.stop(&mut queue);

        // long pause while stopped must not turn into a huge first step
        let later = t0 + Duration::from_secs(10);
        driver.start(later, &mut queue);
        let h = queue.take_due()[0];
        driver
            .on_frame(h, later + Duration::from_micros(16_670), &mut queue)
            .unwrap();
        assert!((driver.objects()[0].aabb().x() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn commands_apply_at_tick_boundary() {
        let mut driver = LoopDriver::new(config(), vec![obj(0, 10.0, 10.0, 0.0)]).unwrap();
        driver.enqueue(Command::Spawn(obj(1, 12.0, 12.0, 0.0)));
        assert_eq!(driver.objects().len(), 1);
        driver.step(1.0).unwrap();
        assert_eq!(driver.objects().len(), 2);
        assert_eq!(driver.stats().actual_collisions, 1);

        driver.enqueue(Command::Remove(ObjectId(0)));
        driver.step(1.0).unwrap();
        assert_eq!(driver.objects().len(), 1);
        assert_eq!(driver.stats().actual_collisions, 0);
        assert!(!driver.objects()[0].colliding);
    }

    #[test]
    fn fps_reported_after_sixty_units() {
        let mut driver = LoopDriver::new(config(), vec![]).unwrap();
        for _ in 0..59 {
            assert_eq!(driver.step(1.0).unwrap().fps, 0.0);
        }
        assert_eq!(driver.step(1.0).unwrap().fps, 60.0);
    }

    #[test]
    fn invalid_dt_is_rejected() {
        let mut driver = LoopDriver::new(config(), vec![]).unwrap();
        assert!(matches!(driver.step(f64::NAN), Err(SimError::InvalidDeltaTime(_))));
    }
}

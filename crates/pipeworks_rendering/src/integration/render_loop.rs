//! Render Loop - fixed-interval simulation under a free-running frame loop.
//!
//! ```text
//! frame(now)
//!   ├── gate open and generation running?
//!   │     └── World::tick ──► events ──► RenderBridge::apply
//!   └── RenderBridge::draw ──► InstanceDrawer
//! ```
//!
//! Simulation and drawing run back to back on the caller's thread and never
//! overlap. Time is supplied by the caller in seconds, so tests can drive frames
//! with synthetic clocks.

use pipeworks_core::{PipeEvent, World};
use serde::{Deserialize, Serialize};

use super::render_bridge::{InstanceDrawer, RenderBridge, RenderBridgeConfig, DEFAULT_INITIAL_CAPACITY};
use crate::error::{RenderError, RenderResult};
use crate::instancing::{BufferAllocator, HeapAllocator};

/// Seconds between simulation ticks by default.
pub const DEFAULT_TICK_INTERVAL_SECS: f64 = 0.25;

/// Configuration for the render loop (the `[render]` table).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderLoopConfig {
    /// Records allocated for each new pipe store
    pub initial_capacity: usize,
    /// Minimum seconds between simulation ticks
    pub tick_interval_secs: f64,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
        }
    }
}

impl RenderLoopConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] for a zero capacity or a negative or
    /// non-finite interval.
    pub fn validate(&self) -> RenderResult<()> {
        if self.initial_capacity == 0 {
            return Err(RenderError::InvalidConfig(
                "initial_capacity must be at least 1".to_owned(),
            ));
        }
        if !self.tick_interval_secs.is_finite() || self.tick_interval_secs < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "tick_interval_secs must be a non-negative number, got {}",
                self.tick_interval_secs
            )));
        }
        Ok(())
    }

    /// Bridge settings carried by this table.
    #[must_use]
    pub const fn bridge(&self) -> RenderBridgeConfig {
        RenderBridgeConfig {
            initial_capacity: self.initial_capacity,
        }
    }
}

/// Opens at most once per interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationGate {
    interval: f64,
    last: f64,
}

impl SimulationGate {
    /// Creates a gate whose first opening is one interval after `start`.
    #[must_use]
    pub const fn new(interval: f64, start: f64) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    /// Interval in seconds.
    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    /// Returns true and restarts the interval if at least one interval has
    /// passed since the last opening.
    pub fn should_tick(&mut self, now: f64) -> bool {
        if now - self.last >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Result of a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameResult {
    /// Frame number, starting at 1
    pub frame_number: u64,
    /// A simulation tick ran this frame
    pub ticked: bool,
    /// Events applied to the bridge this frame
    pub events_applied: usize,
    /// Draw calls issued
    pub draw_calls: usize,
    /// Generation finished (checked after the tick)
    pub generation_complete: bool,
}

/// Statistics for the render loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderLoopStats {
    /// Total frames rendered
    pub total_frames: u64,
    /// Simulation ticks run
    pub simulation_ticks: u64,
    /// Events applied
    pub events_applied: u64,
    /// Draw calls issued
    pub draw_calls: u64,
}

/// Drives a [`World`] and its [`RenderBridge`] one frame at a time.
pub struct RenderLoop<A: BufferAllocator = HeapAllocator> {
    /// Configuration
    config: RenderLoopConfig,
    /// Tick pacing
    gate: SimulationGate,
    /// Event to geometry bridge
    bridge: RenderBridge<A>,
    /// Reused event buffer
    events: Vec<PipeEvent>,
    /// Frame counter
    frame_count: u64,
    /// Statistics
    stats: RenderLoopStats,
}

impl RenderLoop<HeapAllocator> {
    /// Creates a loop with process-memory stores and a clock starting at zero.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] for an invalid configuration.
    pub fn headless(config: RenderLoopConfig) -> RenderResult<Self> {
        Self::new(config, HeapAllocator::new(), 0.0)
    }
}

impl<A: BufferAllocator + Clone> RenderLoop<A> {
    /// Creates a loop. `start` is the clock reading the first interval counts from.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidConfig`] for an invalid configuration.
    pub fn new(config: RenderLoopConfig, allocator: A, start: f64) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            gate: SimulationGate::new(config.tick_interval_secs, start),
            bridge: RenderBridge::new(config.bridge(), allocator)?,
            events: Vec::new(),
            frame_count: 0,
            stats: RenderLoopStats::default(),
            config,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &RenderLoopConfig {
        &self.config
    }

    /// The bridge holding every pipe's geometry.
    #[must_use]
    pub const fn bridge(&self) -> &RenderBridge<A> {
        &self.bridge
    }

    /// Mutable bridge access, e.g. to release stores.
    pub fn bridge_mut(&mut self) -> &mut RenderBridge<A> {
        &mut self.bridge
    }

    /// Counters since creation.
    #[must_use]
    pub const fn stats(&self) -> &RenderLoopStats {
        &self.stats
    }

    /// Runs one frame: an optional simulation tick, then a draw of every pipe.
    ///
    /// # Errors
    ///
    /// Simulation or bridge failures. Events emitted before a failing one have
    /// already been applied.
    pub fn frame<D>(&mut self, world: &mut World, now: f64, drawer: &mut D) -> RenderResult<FrameResult>
    where
        D: InstanceDrawer<A::Buffer>,
    {
        self.frame_count += 1;

        let mut ticked = false;
        let mut events_applied = 0;
        if !world.is_generation_complete() && self.gate.should_tick(now) {
            self.events.clear();
            world.tick(&mut self.events)?;
            self.bridge.apply_all(&self.events)?;
            ticked = true;
            events_applied = self.events.len();
            self.stats.simulation_ticks += 1;
            self.stats.events_applied += events_applied as u64;
        }

        let draw_calls = self.bridge.draw(drawer, world.colors());

        self.stats.total_frames += 1;
        self.stats.draw_calls += draw_calls as u64;

        let result = FrameResult {
            frame_number: self.frame_count,
            ticked,
            events_applied,
            draw_calls,
            generation_complete: world.is_generation_complete(),
        };
        if ticked {
            tracing::debug!(?result, "frame");
        }
        Ok(result)
    }
}

impl<A: BufferAllocator> std::fmt::Debug for RenderLoop<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .field("bridge", &self.bridge)
            .field("frame_count", &self.frame_count)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::RecordingDrawer;
    use pipeworks_core::WorldConfig;

    fn world() -> World {
        World::new(WorldConfig {
            bounds: [6, 6, 6],
            max_pipes: 2,
            seed: Some(9),
            ..WorldConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_gate_interval() {
        let mut gate = SimulationGate::new(0.25, 0.0);
        assert!(!gate.should_tick(0.1));
        assert!(gate.should_tick(0.25));
        assert!(!gate.should_tick(0.4));
        assert!(gate.should_tick(0.6));
        assert!((gate.interval() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_frames_between_ticks_only_draw() {
        let mut world = world();
        let mut render = RenderLoop::headless(RenderLoopConfig::default()).unwrap();
        let mut drawer = RecordingDrawer::new();

        let first = render.frame(&mut world, 0.1, &mut drawer).unwrap();
        assert!(!first.ticked);
        assert_eq!(first.draw_calls, 0);

        let second = render.frame(&mut world, 0.3, &mut drawer).unwrap();
        assert!(second.ticked);
        // First tick spawns one pipe: one ball, no segments.
        assert_eq!(second.events_applied, 1);
        assert_eq!(second.draw_calls, 1);

        let third = render.frame(&mut world, 0.35, &mut drawer).unwrap();
        assert!(!third.ticked);
        assert_eq!(third.draw_calls, 1);
        assert_eq!(render.stats().total_frames, 3);
        assert_eq!(render.stats().simulation_ticks, 1);
    }

    #[test]
    fn test_runs_to_completion_then_stops_ticking() {
        let mut world = world();
        let mut render = RenderLoop::headless(RenderLoopConfig {
            tick_interval_secs: 0.0,
            ..RenderLoopConfig::default()
        })
        .unwrap();
        let mut drawer = RecordingDrawer::new();

        let mut now = 0.0;
        let mut frames = 0;
        while !world.is_generation_complete() {
            render.frame(&mut world, now, &mut drawer).unwrap();
            now += 0.01;
            frames += 1;
            assert!(frames < 10_000, "generation never completed");
        }

        let after = render.frame(&mut world, now, &mut drawer).unwrap();
        assert!(!after.ticked);
        assert!(after.generation_complete);
        assert_eq!(render.bridge().pipe_count(), 2);
        for pipe_id in 0..2 {
            assert!(render.bridge().pipe(pipe_id).unwrap().is_capped());
        }
    }

    #[test]
    fn test_invalid_config() {
        for config in [
            RenderLoopConfig {
                initial_capacity: 0,
                ..RenderLoopConfig::default()
            },
            RenderLoopConfig {
                tick_interval_secs: -1.0,
                ..RenderLoopConfig::default()
            },
            RenderLoopConfig {
                tick_interval_secs: f64::NAN,
                ..RenderLoopConfig::default()
            },
        ] {
            assert!(matches!(
                RenderLoop::headless(config),
                Err(RenderError::InvalidConfig(_))
            ));
        }
    }
}

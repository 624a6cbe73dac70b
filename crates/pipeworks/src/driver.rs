//! # Headless Driver
//!
//! ```text
//! loop:
//!   ├── clock: synthetic (now += frame_step) or wall (Instant::elapsed)
//!   ├── RenderLoop::frame ──► World::tick (gated) ──► RenderBridge
//!   └── RecordingDrawer collects the frame's draw calls
//! until the generation completes or max_frames is reached
//! ```
//!
//! The synthetic clock makes a run a pure function of the seed, which the tests
//! rely on. The wall clock paces ticks like an interactive viewer would.

use std::time::{Duration, Instant};

use pipeworks_core::{World, DEFAULT_SEED};
use pipeworks_rendering::{FrameResult, MeshLibrary, RecordingDrawer, RenderLoop};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Frame step of the synthetic clock (60 FPS).
pub const DEFAULT_FRAME_STEP_SECS: f64 = 1.0 / 60.0;

/// How the driver advances time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverOptions {
    /// Seconds between frames.
    pub frame_step_secs: f64,
    /// Give up after this many frames.
    pub max_frames: u64,
    /// Sleep between frames and read the wall clock.
    pub realtime: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            frame_step_secs: DEFAULT_FRAME_STEP_SECS,
            max_frames: 10_000_000,
            realtime: false,
        }
    }
}

/// What a run produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Seed the world ran with.
    pub seed: u64,
    /// Frames rendered.
    pub frames: u64,
    /// Simulation ticks run.
    pub ticks: u64,
    /// Events applied.
    pub events: u64,
    /// Pipes spawned.
    pub pipes: usize,
    /// Voxels claimed.
    pub used_voxels: usize,
    /// Voxels in the grid.
    pub total_voxels: usize,
    /// `used_voxels / total_voxels`.
    pub fill_ratio: f64,
    /// Draw calls in the final frame.
    pub draw_calls: usize,
    /// Instances drawn in the final frame.
    pub instances: usize,
    /// Triangles drawn in the final frame.
    pub triangles: usize,
    /// The generation finished before `max_frames`.
    pub complete: bool,
}

/// Runs one generation without a window.
pub struct HeadlessDriver {
    world: World,
    render: RenderLoop,
    meshes: MeshLibrary,
    drawer: RecordingDrawer,
    options: DriverOptions,
    seed: u64,
}

impl HeadlessDriver {
    /// Builds the world, render loop and meshes.
    ///
    /// # Errors
    ///
    /// Invalid configuration or mesh generation failure.
    pub fn new(config: AppConfig, options: DriverOptions) -> AppResult<Self> {
        config.validate()?;
        let seed = config.world.seed.unwrap_or(DEFAULT_SEED);
        let meshes = MeshLibrary::procedural()?;
        let render = RenderLoop::headless(config.render)?;
        let world = World::new(config.world)?;
        Ok(Self {
            world,
            render,
            meshes,
            drawer: RecordingDrawer::new(),
            options,
            seed,
        })
    }

    /// The simulated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The render loop.
    #[must_use]
    pub const fn render_loop(&self) -> &RenderLoop {
        &self.render
    }

    /// Runs frames until the generation completes or the frame limit is hit.
    ///
    /// # Errors
    ///
    /// The first simulation or render failure.
    pub fn run(&mut self) -> AppResult<RunSummary> {
        let started = Instant::now();
        let step = Duration::from_secs_f64(self.options.frame_step_secs.max(0.0));
        let mut now = 0.0;
        let mut last = FrameResult::default();
        let mut frames = 0;

        while frames < self.options.max_frames {
            self.drawer.clear();
            last = self.render.frame(&mut self.world, now, &mut self.drawer)?;
            frames += 1;
            if last.generation_complete {
                break;
            }
            if self.options.realtime {
                std::thread::sleep(step);
                now = started.elapsed().as_secs_f64();
            } else {
                now += self.options.frame_step_secs;
            }
        }

        if !last.generation_complete {
            tracing::warn!(frames, "frame limit reached before the generation completed");
        }

        let stats = self.render.stats();
        let grid = self.world.grid();
        let summary = RunSummary {
            seed: self.seed,
            frames,
            ticks: stats.simulation_ticks,
            events: stats.events_applied,
            pipes: self.world.pipe_count(),
            used_voxels: grid.used(),
            total_voxels: grid.total_voxels(),
            fill_ratio: grid.fill_ratio(),
            draw_calls: last.draw_calls,
            instances: self.drawer.instance_count(),
            triangles: self.triangles_drawn(),
            complete: last.generation_complete,
        };
        tracing::info!(?summary, elapsed_ms = started.elapsed().as_millis() as u64, "run finished");
        Ok(summary)
    }

    fn triangles_drawn(&self) -> usize {
        self.drawer
            .calls()
            .iter()
            .map(|call| call.range.count * self.meshes.get(call.mesh).triangle_count())
            .sum()
    }
}

//! # World
//!
//! Owns the grid, the RNG and every pipe, and turns growth into [`PipeEvent`]s.
//!
//! ## Pipe Lifecycle
//!
//! ```text
//! SPAWNING ──spawn_if_room──► FIRST_SEGMENT ──step──► GROWING ──step──► DEAD
//!  (no pipe)                    (1 node)               (>= 2 nodes)     (terminal,
//!                                   │                                    nodes kept)
//!                                   └────────── boxed in ───────────────────┘
//! ```
//!
//! ## Tick
//!
//! One [`World::step`] per alive pipe in id order, then one
//! [`World::spawn_if_room`]. Pipe ids are never reused.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::WorldConfig;
use crate::error::{SimError, SimResult};
use crate::events::{GrowthEvent, PipeEvent};
use crate::grid::OccupancyGrid;
use crate::pipe::{Growth, Pipe};

/// Seed used when the config does not provide one.
pub const DEFAULT_SEED: u64 = 0x5049_5045_574F_524B;

/// Percentage of the grid a pipe must cover before the fill-ratio death check applies.
pub const KILL_CHECK_MIN_PERCENT: usize = 10;

/// Outcome of one [`World::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Events appended during this tick.
    pub events: usize,
    /// Pipes still alive after the tick.
    pub active_pipes: usize,
    /// Voxels claimed after the tick.
    pub used_voxels: usize,
}

/// The pipe population and the space it grows in.
pub struct World {
    config: WorldConfig,
    grid: OccupancyGrid,
    rng: ChaCha8Rng,
    pipes: Vec<Pipe>,
    /// One RGB color per pipe slot.
    colors: Vec<[f32; 3]>,
    active_pipes: usize,
    /// Set once spawning hit a full grid.
    spawning_halted: bool,
    tick_count: u64,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns the config's validation error.
    pub fn new(config: WorldConfig) -> SimResult<Self> {
        config.validate()?;
        let grid = OccupancyGrid::new(config.grid_bounds()?);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or(DEFAULT_SEED));

        let colors = (0..config.max_pipes)
            .map(|_| [rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()])
            .collect();

        tracing::debug!(
            bounds = ?config.bounds,
            max_pipes = config.max_pipes,
            seed = ?config.seed,
            "world created"
        );

        Ok(Self {
            pipes: Vec::with_capacity(usize::from(config.max_pipes)),
            config,
            grid,
            rng,
            colors,
            active_pipes: 0,
            spawning_halted: false,
            tick_count: 0,
        })
    }

    /// Configuration this world was built from.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The occupancy grid.
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Number of pipes ever spawned.
    #[must_use]
    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    /// Number of pipes still alive.
    #[must_use]
    pub const fn active_pipes(&self) -> usize {
        self.active_pipes
    }

    /// Spawn cap.
    #[must_use]
    pub const fn max_pipes(&self) -> u8 {
        self.config.max_pipes
    }

    /// Ticks executed so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Pipe by id.
    #[must_use]
    pub fn pipe(&self, pipe_id: usize) -> Option<&Pipe> {
        self.pipes.get(pipe_id)
    }

    /// All pipes, indexed by id.
    #[must_use]
    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Display color of a pipe slot.
    #[must_use]
    pub fn pipe_color(&self, pipe_id: usize) -> Option<[f32; 3]> {
        self.colors.get(pipe_id).copied()
    }

    /// Colors of every pipe slot.
    #[must_use]
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// Returns true once no pipe is alive and none may spawn.
    #[must_use]
    pub fn is_generation_complete(&self) -> bool {
        self.active_pipes == 0
            && (self.pipes.len() == usize::from(self.config.max_pipes) || self.spawning_halted)
    }

    /// Grows one pipe by a single voxel and reports what happened.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownPipe`] for an id never spawned, [`SimError::PipeDead`] for a
    /// pipe that can no longer grow.
    pub fn step(&mut self, pipe_id: usize) -> SimResult<PipeEvent> {
        let total = self.grid.total_voxels();
        let pipe = self
            .pipes
            .get_mut(pipe_id)
            .ok_or(SimError::UnknownPipe(pipe_id))?;

        let last_node = pipe.head();
        let last_dir = pipe.direction();
        let was_first = pipe.len() == 1;

        let (current_node, current_dir) = match pipe.advance(&mut self.grid, &mut self.rng) {
            Growth::Extended { to, direction, .. } => (to, direction),
            Growth::Exhausted => {
                self.active_pipes -= 1;
                tracing::info!(pipe_id, length = pipe.len(), "pipe boxed in");
                return Ok(PipeEvent::Died {
                    pipe_id,
                    head: last_node,
                    direction: last_dir,
                });
            }
            Growth::Dormant => return Err(SimError::PipeDead(pipe_id)),
        };

        // Fill-ratio death check. The node grown above is kept either way.
        if pipe.len() >= total * KILL_CHECK_MIN_PERCENT / 100 {
            let kill_probability = self
                .config
                .death_curve
                .kill_probability(self.grid.fill_ratio());
            if self.rng.gen::<f64>() < kill_probability {
                pipe.kill();
                self.active_pipes -= 1;
                tracing::info!(pipe_id, length = pipe.len(), kill_probability, "pipe retired");
            }
        }

        let growth = GrowthEvent {
            pipe_id,
            last_node,
            current_node,
            last_dir,
            current_dir,
            alive: pipe.is_alive(),
        };

        Ok(if was_first {
            PipeEvent::FirstPipe(growth)
        } else if current_dir != last_dir {
            PipeEvent::PipeBend(growth)
        } else {
            PipeEvent::PipeStraight(growth)
        })
    }

    /// Spawns a pipe if the population is below the cap.
    ///
    /// At the cap this is a no-op returning `Ok(None)`, however often it is called.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::GridExhausted`] when no start voxel is left.
    pub fn spawn_if_room(&mut self) -> SimResult<Option<PipeEvent>> {
        if self.pipes.len() >= usize::from(self.config.max_pipes) {
            return Ok(None);
        }

        let pipe = Pipe::spawn(&mut self.grid, &mut self.rng)?;
        let start_node = pipe.head();
        let pipe_id = self.pipes.len();
        self.pipes.push(pipe);
        self.active_pipes += 1;

        tracing::info!(pipe_id, ?start_node, "pipe spawned");
        Ok(Some(PipeEvent::New { pipe_id, start_node }))
    }

    /// Runs one simulation tick, appending every event to `events`.
    ///
    /// A full grid stops further spawning instead of failing the tick.
    ///
    /// # Errors
    ///
    /// Propagates any error other than [`SimError::GridExhausted`] from spawning.
    pub fn tick(&mut self, events: &mut Vec<PipeEvent>) -> SimResult<TickSummary> {
        self.tick_count += 1;
        let before = events.len();

        for pipe_id in 0..self.pipes.len() {
            if self.pipes[pipe_id].is_alive() {
                events.push(self.step(pipe_id)?);
            }
        }

        if !self.spawning_halted {
            match self.spawn_if_room() {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(SimError::GridExhausted) => {
                    self.spawning_halted = true;
                    tracing::warn!(
                        spawned = self.pipes.len(),
                        max_pipes = self.config.max_pipes,
                        "grid exhausted, spawning halted"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let summary = TickSummary {
            tick: self.tick_count,
            events: events.len() - before,
            active_pipes: self.active_pipes,
            used_voxels: self.grid.used(),
        };
        tracing::debug!(?summary, "world tick");

        if summary.events > 0 && self.is_generation_complete() {
            tracing::info!(
                tick = self.tick_count,
                pipes = self.pipes.len(),
                fill_ratio = self.grid.fill_ratio(),
                "generation complete"
            );
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeathCurve;

    fn config(bounds: [u32; 3], max_pipes: u8, seed: u64) -> WorldConfig {
        WorldConfig {
            bounds,
            max_pipes,
            seed: Some(seed),
            death_curve: DeathCurve::Identity,
        }
    }

    #[test]
    fn test_spawn_until_cap_then_noop() {
        let mut world = World::new(config([6, 6, 6], 3, 1)).unwrap();

        for expected_id in 0..3 {
            match world.spawn_if_room().unwrap() {
                Some(PipeEvent::New { pipe_id, start_node }) => {
                    assert_eq!(pipe_id, expected_id);
                    assert!(world.grid().is_occupied(start_node));
                }
                other => panic!("expected New, got {other:?}"),
            }
        }

        let used = world.grid().used();
        for _ in 0..10 {
            assert_eq!(world.spawn_if_room().unwrap(), None);
        }
        assert_eq!(world.pipe_count(), 3);
        assert_eq!(world.active_pipes(), 3);
        assert_eq!(world.grid().used(), used);
    }

    #[test]
    fn test_first_step_emits_first_pipe() {
        let mut world = World::new(config([8, 8, 8], 1, 5)).unwrap();
        world.spawn_if_room().unwrap();
        let start = world.pipe(0).unwrap().head();

        let event = world.step(0).unwrap();
        let PipeEvent::FirstPipe(growth) = event else {
            panic!("expected FirstPipe, got {event:?}");
        };
        assert_eq!(growth.pipe_id, 0);
        assert_eq!(growth.last_node, start);
        assert_eq!(growth.current_node, world.pipe(0).unwrap().head());
    }

    #[test]
    fn test_bend_and_straight_classification() {
        let mut world = World::new(config([10, 10, 10], 1, 11)).unwrap();
        world.spawn_if_room().unwrap();
        world.step(0).unwrap();

        for _ in 0..30 {
            if !world.pipe(0).unwrap().is_alive() {
                break;
            }
            match world.step(0).unwrap() {
                PipeEvent::PipeStraight(g) => assert_eq!(g.last_dir, g.current_dir),
                PipeEvent::PipeBend(g) => assert_ne!(g.last_dir, g.current_dir),
                PipeEvent::Died { .. } => break,
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_and_dead_pipes() {
        let mut world = World::new(config([1, 1, 1], 1, 0)).unwrap();
        assert_eq!(world.step(0), Err(SimError::UnknownPipe(0)));

        world.spawn_if_room().unwrap();
        let head = world.pipe(0).unwrap().head();
        // Single voxel: the pipe is boxed in immediately.
        assert_eq!(
            world.step(0).unwrap(),
            PipeEvent::Died { pipe_id: 0, head, direction: world.pipe(0).unwrap().direction() }
        );
        assert_eq!(world.active_pipes(), 0);
        assert_eq!(world.step(0), Err(SimError::PipeDead(0)));
        assert!(world.is_generation_complete());
    }

    #[test]
    fn test_active_count_matches_alive_pipes() {
        let mut world = World::new(config([6, 6, 6], 5, 77)).unwrap();
        let mut events = Vec::new();

        for _ in 0..500 {
            world.tick(&mut events).unwrap();
            let alive = world.pipes().iter().filter(|p| p.is_alive()).count();
            assert_eq!(world.active_pipes(), alive);
            let nodes: usize = world.pipes().iter().map(Pipe::len).sum();
            assert_eq!(world.grid().used(), nodes);
            if world.is_generation_complete() {
                break;
            }
        }
        assert!(world.is_generation_complete());
    }

    #[test]
    fn test_full_grid_halts_spawning() {
        // Two voxels, four pipe slots: the third spawn finds no room.
        let mut world = World::new(config([2, 1, 1], 4, 3)).unwrap();
        let mut events = Vec::new();
        for _ in 0..10 {
            world.tick(&mut events).unwrap();
        }
        assert!(world.pipe_count() < 4);
        assert!(world.grid().is_full());
        assert!(world.is_generation_complete());
    }

    #[test]
    fn test_same_seed_same_events() {
        let run = || {
            let mut world = World::new(config([7, 7, 7], 3, 1234)).unwrap();
            let mut events = Vec::new();
            for _ in 0..60 {
                world.tick(&mut events).unwrap();
            }
            events
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_colors_per_slot() {
        let world = World::new(config([4, 4, 4], 6, 8)).unwrap();
        assert_eq!(world.colors().len(), 6);
        for color in world.colors() {
            assert!(color.iter().all(|c| (0.0..1.0).contains(c)));
        }
        assert_eq!(world.pipe_color(6), None);
    }
}

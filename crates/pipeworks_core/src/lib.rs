//! # PIPEWORKS Core
//!
//! Occupancy-tracked growth simulation for procedural 3D pipes.
//!
//! ## Architecture Rules
//!
//! 1. **Claims are permanent** - a voxel belongs to exactly one pipe, forever
//! 2. **One voxel per step** - growth is never batched
//! 3. **Explicit randomness** - the RNG is a parameter, never global state
//! 4. **Death is data** - dead pipes are reported through events, not errors
//!
//! ## Data Flow
//!
//! ```text
//! World::tick
//!   ├── step(id) for every alive pipe ──► Pipe::advance ──► OccupancyGrid
//!   │                                           │
//!   │                                           └──► PipeEvent (one per pipe)
//!   └── spawn_if_room ──► Pipe::spawn ──► OccupancyGrid::take_random_free
//!                                           │
//!                                           └──► PipeEvent::New
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use pipeworks_core::{World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig { seed: Some(42), ..WorldConfig::default() })?;
//! let mut events = Vec::new();
//! while !world.is_generation_complete() {
//!     world.tick(&mut events)?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod direction;
pub mod error;
pub mod events;
pub mod grid;
pub mod pipe;
pub mod world;

pub use config::{DeathCurve, WorldConfig};
pub use direction::{Axis, Direction};
pub use error::{SimError, SimResult};
pub use events::{GrowthEvent, PipeEvent};
pub use grid::{GridBounds, OccupancyGrid, Voxel, MAX_VOXELS};
pub use pipe::{Growth, Pipe};
pub use world::{TickSummary, World, DEFAULT_SEED, KILL_CHECK_MIN_PERCENT};

//! # PIPEWORKS
//!
//! Procedural 3D pipes: pipes grow voxel by voxel through a bounded grid, never
//! crossing, until none can grow and no more may spawn.
//!
//! ## Crates
//!
//! ```text
//! ┌──────────────────────┐   PipeEvent   ┌───────────────────────┐
//! │   pipeworks_core     │ ────────────► │  pipeworks_rendering  │
//! │  • OccupancyGrid     │               │  • InstanceStore      │
//! │  • Pipe growth       │               │  • RenderBridge       │
//! │  • World / events    │               │  • RenderLoop         │
//! └──────────────────────┘               └───────────────────────┘
//!             ▲                                      ▲
//!             └───────── pipeworks (this crate) ─────┘
//!                        • AppConfig (TOML)
//!                        • HeadlessDriver
//! ```

pub mod config;
pub mod driver;
pub mod error;

// Re-export the layers
pub use pipeworks_core as core;
pub use pipeworks_rendering as rendering;

pub use config::AppConfig;
pub use driver::{DriverOptions, HeadlessDriver, RunSummary, DEFAULT_FRAME_STEP_SECS};
pub use error::{AppError, AppResult};

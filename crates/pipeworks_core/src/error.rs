//! # Simulation Error Types
//!
//! All errors that can occur while growing pipes.
//!
//! Pipe death is NOT an error. It is reported through
//! [`PipeEvent::Died`](crate::PipeEvent::Died) and the `alive` flag of growth events.

use thiserror::Error;

/// Errors that can occur in the growth simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No free voxel is left in the grid. Spawning must stop; retrying cannot help
    /// because claims are never released.
    #[error("no free voxel left in the grid")]
    GridExhausted,

    /// Grid bounds have a zero axis or their product does not fit in memory.
    #[error("invalid grid bounds {x}x{y}x{z}")]
    InvalidBounds {
        /// Extent along X.
        x: u32,
        /// Extent along Y.
        y: u32,
        /// Extent along Z.
        z: u32,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pipe id was never spawned.
    #[error("unknown pipe: {0}")]
    UnknownPipe(usize),

    /// Pipe can no longer grow.
    #[error("pipe {0} is dead")]
    PipeDead(usize),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;

//! Pipe events emitted by the [`World`](crate::World).
//!
//! Exactly one event is emitted per pipe step and one per spawn. The render side
//! matches them exhaustively; there is no "no-op" variant.

use crate::direction::Direction;
use crate::grid::Voxel;

/// Payload shared by every growth event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthEvent {
    /// Pipe that grew.
    pub pipe_id: usize,
    /// Head before the step.
    pub last_node: Voxel,
    /// Head after the step.
    pub current_node: Voxel,
    /// Heading before the step.
    pub last_dir: Direction,
    /// Heading of the step.
    pub current_dir: Direction,
    /// False when the fill-ratio death check ended the pipe after this step.
    pub alive: bool,
}

/// What happened to one pipe during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeEvent {
    /// A pipe was spawned.
    New {
        /// Id of the new pipe.
        pipe_id: usize,
        /// Its first node.
        start_node: Voxel,
    },
    /// The pipe's first move away from its start node.
    FirstPipe(GrowthEvent),
    /// The pipe kept its heading.
    PipeStraight(GrowthEvent),
    /// The pipe turned.
    PipeBend(GrowthEvent),
    /// The pipe found no free neighbor and made no move.
    Died {
        /// Pipe that died.
        pipe_id: usize,
        /// Last node.
        head: Voxel,
        /// Last heading.
        direction: Direction,
    },
}

impl PipeEvent {
    /// Pipe this event belongs to.
    #[must_use]
    pub const fn pipe_id(&self) -> usize {
        match self {
            Self::New { pipe_id, .. } | Self::Died { pipe_id, .. } => *pipe_id,
            Self::FirstPipe(g) | Self::PipeStraight(g) | Self::PipeBend(g) => g.pipe_id,
        }
    }

    /// Growth payload, if this is a growth event.
    #[must_use]
    pub const fn growth(&self) -> Option<&GrowthEvent> {
        match self {
            Self::FirstPipe(g) | Self::PipeStraight(g) | Self::PipeBend(g) => Some(g),
            Self::New { .. } | Self::Died { .. } => None,
        }
    }

    /// Returns true if the pipe is dead after this event.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self {
            Self::Died { .. } => true,
            Self::FirstPipe(g) | Self::PipeStraight(g) | Self::PipeBend(g) => !g.alive,
            Self::New { .. } => false,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::New { .. } => "new",
            Self::FirstPipe(_) => "first_pipe",
            Self::PipeStraight(_) => "pipe_straight",
            Self::PipeBend(_) => "pipe_bend",
            Self::Died { .. } => "died",
        }
    }
}

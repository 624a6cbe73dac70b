//! # Pipe Growth Agent
//!
//! A pipe is a polyline of claimed voxels that grows one voxel per call to
//! [`Pipe::advance`] until it runs out of free neighbors.
//!
//! ## Directional Inertia
//!
//! Before each move a fair coin is flipped. On "keep going" the current heading is
//! tried first and the other five follow in random order; otherwise all six are
//! shuffled. Straight runs therefore happen about twice as often as turns.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::direction::Direction;
use crate::error::{SimError, SimResult};
use crate::grid::{OccupancyGrid, Voxel};

/// Result of a single [`Pipe::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Growth {
    /// The pipe claimed one more voxel.
    Extended {
        /// Previous head.
        from: Voxel,
        /// New head.
        to: Voxel,
        /// Direction of the move.
        direction: Direction,
    },
    /// No free neighbor: the pipe died during this call. Nodes are unchanged.
    Exhausted,
    /// The pipe was already dead. Nothing happened.
    Dormant,
}

/// A single growing pipe.
#[derive(Clone, Debug)]
pub struct Pipe {
    alive: bool,
    nodes: Vec<Voxel>,
    current_dir: Direction,
}

impl Pipe {
    /// Spawns a pipe on a random free voxel, claiming it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::GridExhausted`] if the grid has no free voxel.
    pub fn spawn<R: Rng + ?Sized>(grid: &mut OccupancyGrid, rng: &mut R) -> SimResult<Self> {
        let start = grid.take_random_free(rng).ok_or(SimError::GridExhausted)?;
        Ok(Self::at(start, Direction::random(rng)))
    }

    /// Creates a pipe at an already-claimed start voxel.
    #[must_use]
    pub fn at(start: Voxel, direction: Direction) -> Self {
        Self {
            alive: true,
            nodes: vec![start],
            current_dir: direction,
        }
    }

    /// Returns true while the pipe can still grow.
    #[inline]
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Current heading.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.current_dir
    }

    /// Last node of the polyline.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Voxel {
        // `nodes` is never empty.
        self.nodes[self.nodes.len() - 1]
    }

    /// Number of nodes (always at least one).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A pipe always holds its start node, so this is always false.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, start first.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Voxel] {
        &self.nodes
    }

    /// Marks the pipe dead. Terminal.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Grows the pipe by one voxel if any neighbor is free.
    pub fn advance<R: Rng + ?Sized>(&mut self, grid: &mut OccupancyGrid, rng: &mut R) -> Growth {
        if !self.alive {
            return Growth::Dormant;
        }

        let mut candidates = Direction::ALL;
        let want_to_turn = rng.gen_bool(0.5);
        if self.nodes.len() > 1 && !want_to_turn {
            let current = self.current_dir as usize;
            candidates.swap(0, current);
            candidates[1..].shuffle(rng);
        } else {
            candidates.shuffle(rng);
        }

        let from = self.head();
        let chosen = candidates.into_iter().find_map(|dir| {
            grid.step(from, dir)
                .filter(|&next| !grid.is_occupied(next))
                .map(|next| (dir, next))
        });

        let Some((direction, to)) = chosen else {
            self.alive = false;
            return Growth::Exhausted;
        };

        grid.claim(to);
        self.nodes.push(to);
        self.current_dir = direction;

        Growth::Extended { from, to, direction }
    }
}
